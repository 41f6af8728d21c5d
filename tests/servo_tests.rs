//! Servo sweep tests

use sonar_sweep::system::config::SERVO;
use sonar_sweep::system::servo::StepOutcome;
use sonar_sweep::{Direction, DutyCycleOutput, ServoActuator, ServoConfig, ServoError};

/// Records every compare register write.
#[derive(Default)]
struct RecordingPwm {
    writes: Vec<u16>,
}

impl DutyCycleOutput for RecordingPwm {
    fn set_compare(&mut self, ticks: u16) {
        self.writes.push(ticks);
    }
}

fn servo() -> ServoActuator<RecordingPwm> {
    ServoActuator::new(RecordingPwm::default(), SERVO).unwrap()
}

#[test]
fn test_clockwise_step() {
    let mut servo = servo();
    assert_eq!(servo.move_servo(Direction::Clockwise), StepOutcome::Moved(1600));
    assert_eq!(servo.position(), 1600);
    assert_eq!(*servo.pwm().writes.last().unwrap(), 1600);
}

#[test]
fn test_counter_clockwise_step() {
    let mut servo = servo();
    assert_eq!(
        servo.move_servo(Direction::CounterClockwise),
        StepOutcome::Moved(1800)
    );
}

#[test]
fn test_blocked_at_bounds_still_writes() {
    let mut servo = servo();
    servo.set_duty_cycle(SERVO.min_bound).unwrap();
    let writes = servo.pwm().writes.len();

    assert_eq!(servo.move_servo(Direction::Clockwise), StepOutcome::Blocked(700));
    assert_eq!(servo.position(), 700);
    assert_eq!(servo.pwm().writes.len(), writes + 1);

    servo.set_duty_cycle(SERVO.max_bound).unwrap();
    assert_eq!(
        servo.move_servo(Direction::CounterClockwise),
        StepOutcome::Blocked(2700)
    );
}

#[test]
fn test_center_parks_servo() {
    let mut servo = servo();
    servo.set_duty_cycle(900).unwrap();
    assert_eq!(servo.center(), StepOutcome::Centered(1700));
    assert_eq!(servo.direction(), Direction::Centered);

    // Centered never toggles and stays put
    assert!(!servo.toggle());
    assert_eq!(servo.sweep(), StepOutcome::Centered(1700));
}

#[test]
fn test_toggle_at_max_clockwise() {
    let mut servo = servo();
    servo.set_duty_cycle(SERVO.max_bound).unwrap();
    servo.set_direction(Direction::Clockwise);

    assert!(servo.toggle());
    assert_eq!(servo.direction(), Direction::CounterClockwise);
}

#[test]
fn test_toggle_inside_range_does_nothing() {
    let mut servo = servo();
    assert!(!servo.toggle());
    assert_eq!(servo.direction(), Direction::Clockwise);
}

#[test]
fn test_sweep_stays_in_bounds_and_reverses() {
    let mut servo = servo();
    let mut reached_min = false;
    let mut reached_max = false;

    for _ in 0..200 {
        let outcome = servo.sweep();
        let position = outcome.position();
        assert!(SERVO.contains(position), "left bounds at {}", position);
        assert_eq!(position, servo.position());

        reached_min |= position == SERVO.min_bound;
        reached_max |= position == SERVO.max_bound;
    }

    assert!(reached_min);
    assert!(reached_max);
    assert!(servo.pwm().writes.iter().all(|&w| SERVO.contains(w)));
}

#[test]
fn test_first_sweep_reaches_min_in_ten_steps() {
    let mut servo = servo();
    for _ in 0..10 {
        servo.sweep();
    }
    assert_eq!(servo.position(), 700);

    // Reverse at the bound, then climb
    assert_eq!(servo.sweep(), StepOutcome::Moved(800));
    assert_eq!(servo.direction(), Direction::CounterClockwise);
}

#[test]
fn test_set_duty_cycle_out_of_range() {
    let mut servo = servo();
    assert_eq!(
        servo.set_duty_cycle(699),
        Err(ServoError::DutyCycleOutOfRange(699))
    );
    assert_eq!(
        servo.set_duty_cycle(2701),
        Err(ServoError::DutyCycleOutOfRange(2701))
    );
    assert_eq!(servo.position(), 1700);
}

#[test]
fn test_set_degrees() {
    let mut servo = servo();
    servo.set_degrees(0).unwrap();
    assert_eq!(servo.position(), 700);
    servo.set_degrees(180).unwrap();
    assert_eq!(servo.position(), 2700);
    assert_eq!(servo.degrees(), 180);
    assert_eq!(servo.set_degrees(181), Err(ServoError::AngleOutOfRange(181)));
}

#[test]
fn test_degree_round_trip_within_one_degree() {
    for degrees in 0..=SERVO.max_degrees {
        let back = SERVO.duty_cycle_to_degrees(SERVO.degrees_to_duty_cycle(degrees));
        assert!(degrees.abs_diff(back) <= 1, "{} -> {}", degrees, back);
    }
}

#[test]
fn test_duty_round_trip_within_one_degree_of_ticks() {
    let ticks_per_degree =
        (SERVO.max_bound - SERVO.min_bound).div_ceil(SERVO.max_degrees);
    for ticks in SERVO.min_bound..=SERVO.max_bound {
        let back = SERVO.degrees_to_duty_cycle(SERVO.duty_cycle_to_degrees(ticks));
        assert!(SERVO.contains(back));
        assert!(ticks.abs_diff(back) <= ticks_per_degree, "{} -> {}", ticks, back);
    }
}

#[test]
fn test_odd_step_finishes_stroke_on_bounds() {
    let config = ServoConfig { step: 300, ..SERVO };
    let mut servo = ServoActuator::new(RecordingPwm::default(), config).unwrap();
    let mut lowest = u16::MAX;
    let mut highest = 0;
    for _ in 0..100 {
        let position = servo.sweep().position();
        assert!(config.contains(position));
        lowest = lowest.min(position);
        highest = highest.max(position);
    }
    // 1700 - 3 * 300 = 800, the next stroke ends on 700 rather than stopping short
    assert_eq!(lowest, 700);
    assert_eq!(highest, 2700);
}

#[test]
fn test_sweep_leaves_min_when_heading_away() {
    let mut servo = servo();
    servo.set_direction(Direction::CounterClockwise);
    servo.set_degrees(0).unwrap();

    assert_eq!(servo.sweep(), StepOutcome::Moved(800));
    assert_eq!(servo.direction(), Direction::CounterClockwise);
}

#[test]
fn test_sweep_leaves_max_when_heading_away() {
    let mut servo = servo();
    servo.set_duty_cycle(SERVO.max_bound).unwrap();
    servo.set_direction(Direction::Clockwise);

    let positions: Vec<u16> = (0..5).map(|_| servo.sweep().position()).collect();
    assert_eq!(positions, vec![2600, 2500, 2400, 2300, 2200]);
}

#[test]
fn test_sweep_reverses_only_on_bound_ahead() {
    let mut servo = servo();
    servo.set_duty_cycle(SERVO.max_bound).unwrap();
    servo.set_direction(Direction::CounterClockwise);

    assert_eq!(servo.sweep(), StepOutcome::Moved(2600));
    assert_eq!(servo.direction(), Direction::Clockwise);
}

/// Deterministic mix of setter calls and sweeps. After every setter the
/// servo must keep moving, turn only on the bound it was heading for and
/// reach both bounds again.
#[test]
fn test_sweep_recovers_after_any_setter() {
    let mut servo = servo();
    let span = SERVO.max_bound - SERVO.min_bound;
    let mut seed: u32 = 0x9e37_79b9;
    let mut next = || {
        // xorshift32
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed
    };

    for round in 0..300 {
        let pick = next();
        let direction = if next() % 2 == 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        match pick % 4 {
            0 => servo
                .set_duty_cycle(SERVO.min_bound + (next() % (u32::from(span) + 1)) as u16)
                .unwrap(),
            1 => servo
                .set_degrees((next() % (u32::from(SERVO.max_degrees) + 1)) as u16)
                .unwrap(),
            2 => servo.set_direction(direction),
            _ => {
                servo.center();
                assert_eq!(servo.sweep(), StepOutcome::Centered(SERVO.center));
                servo.set_direction(direction);
            }
        }

        let mut reached_min = false;
        let mut reached_max = false;
        for _ in 0..50 {
            let before = servo.position();
            let heading = servo.direction();
            let after = servo.sweep().position();

            assert!(SERVO.contains(after), "round {}: left bounds at {}", round, after);
            assert_ne!(before, after, "round {}: stalled at {}", round, before);
            if servo.direction() != heading {
                let bound_ahead = match heading {
                    Direction::Clockwise => SERVO.min_bound,
                    _ => SERVO.max_bound,
                };
                assert_eq!(before, bound_ahead, "round {}: turned off a bound", round);
            }

            reached_min |= after == SERVO.min_bound;
            reached_max |= after == SERVO.max_bound;
        }
        assert!(reached_min && reached_max, "round {}: missed a bound", round);
    }
}
