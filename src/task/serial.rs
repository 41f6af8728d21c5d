//! Serial report output
//!
//! UART0 runs transmit only at 9600 8N1 with its FIFOs switched off, so the
//! transmit interrupt means "holding register empty" and each interrupt moves
//! exactly one frame byte. The frame state lives in [`TRANSMITTER`]; the
//! sampling task arms it, [`SerialTxInterruptHandler`] drains it.
//!
//! UART0_IRQ runs at a more urgent priority than the sampling executor, so it
//! preempts sampling but is never preempted by it.

use defmt::info;
use embassy_rp::interrupt::typelevel::{Binding, Handler, Interrupt, UART0_IRQ};
use embassy_rp::interrupt::Priority;
use embassy_rp::pac;
use embassy_rp::uart::{self, UartTx};
use sonar_sweep::system::config::{Parity, SERIAL};
use sonar_sweep::system::report::FRAME_PREFIX;
use sonar_sweep::system::serial_tx::{TxEvent, TxRegister};
use sonar_sweep::system::state::SharedTransmitter;

use crate::board::resources::SerialResources;

/// Frame state shared by the sampling task and the UART interrupt.
pub static TRANSMITTER: SharedTransmitter = SharedTransmitter::new(FRAME_PREFIX);

/// Priority of the transmit interrupt, above the sampling executor.
pub const SERIAL_PRIORITY: Priority = Priority::P1;

/// Register-level view of UART0's transmit side.
pub struct Uart0Tx;

impl TxRegister for Uart0Tx {
    fn write(&mut self, byte: u8) {
        pac::UART0.uartdr().write(|w| w.set_data(byte));
    }

    fn enable_empty_interrupt(&mut self) {
        pac::UART0.uartimsc().modify(|w| w.set_txim(true));
        // The PL011 only raises TXINTR on the transition to empty, so the
        // first byte of a frame is kicked off by pending the line by hand.
        UART0_IRQ::pend();
    }

    fn disable_empty_interrupt(&mut self) {
        pac::UART0.uartimsc().modify(|w| w.set_txim(false));
        pac::UART0.uarticr().write(|w| w.set_txic(true));
    }
}

/// UART0 transmit-empty handler.
pub struct SerialTxInterruptHandler;

impl Handler<UART0_IRQ> for SerialTxInterruptHandler {
    unsafe fn on_interrupt() {
        let event = TRANSMITTER.with(|tx| tx.on_tx_empty(&mut Uart0Tx));
        if event == TxEvent::FrameComplete {
            info!("frame sent");
        }
    }
}

/// Bring up UART0 for reports and enable its interrupt.
pub fn init(
    r: SerialResources,
    _irqs: impl Binding<UART0_IRQ, SerialTxInterruptHandler>,
) -> UartTx<'static, uart::Blocking> {
    let mut config = uart::Config::default();
    config.baudrate = SERIAL.baud_rate;
    config.data_bits = uart::DataBits::DataBits8;
    config.stop_bits = uart::StopBits::STOP1;
    config.parity = match SERIAL.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };

    let tx = UartTx::new_blocking(r.uart, r.tx_pin, config);

    // One-byte holding register instead of the 32 byte FIFO.
    pac::UART0.uartlcr_h().modify(|w| w.set_fen(false));
    Uart0Tx.disable_empty_interrupt();

    UART0_IRQ::unpend();
    UART0_IRQ::set_priority(SERIAL_PRIORITY);
    // SAFETY: the handler only touches TRANSMITTER through its mutex.
    unsafe { UART0_IRQ::enable() };

    info!("serial ready at {} baud", SERIAL.baud_rate);
    tx
}
