//! Polled UART0 on GPIO0 (TX) / GPIO1 (RX).

use core::fmt;

/// IO_BANK0 function select for UART on GPIO0/1.
const FUNCSEL_UART: u8 = 2;

pub struct Uart0;

impl Uart0 {
    /// Bring UART0 out of reset and configure it for 8N1 at `baud`.
    pub fn init(clk_peri_hz: u32, baud: u32) {
        let clocks = unsafe { &*rp2040_pac::CLOCKS::ptr() };
        let resets = unsafe { &*rp2040_pac::RESETS::ptr() };
        let io = unsafe { &*rp2040_pac::IO_BANK0::ptr() };
        let uart = unsafe { &*rp2040_pac::UART0::ptr() };

        // clk_peri defaults to clk_sys as its source, but starts disabled.
        clocks.clk_peri_ctrl.modify(|_, w| w.enable().set_bit());

        resets.reset.modify(|_, w| {
            w.uart0()
                .clear_bit()
                .io_bank0()
                .clear_bit()
                .pads_bank0()
                .clear_bit()
        });
        loop {
            let done = resets.reset_done.read();
            if done.uart0().bit_is_set()
                && done.io_bank0().bit_is_set()
                && done.pads_bank0().bit_is_set()
            {
                break;
            }
            cortex_m::asm::nop();
        }

        for pin in 0..2 {
            io.gpio[pin]
                .gpio_ctrl
                .write(|w| unsafe { w.funcsel().bits(FUNCSEL_UART) });
        }

        let (ibrd, fbrd) = baud_divisors(clk_peri_hz, baud);
        uart.uartibrd.write(|w| unsafe { w.baud_divint().bits(ibrd) });
        uart.uartfbrd.write(|w| unsafe { w.baud_divfrac().bits(fbrd) });
        // The divisors only latch on a write to LCR_H.
        uart.uartlcr_h
            .write(|w| unsafe { w.wlen().bits(0b11) }.fen().set_bit());
        uart.uartcr
            .write(|w| w.uarten().set_bit().txe().set_bit().rxe().set_bit());
    }

    pub fn write_byte(&self, byte: u8) {
        let uart = unsafe { &*rp2040_pac::UART0::ptr() };
        while uart.uartfr.read().txff().bit_is_set() {
            cortex_m::asm::nop();
        }
        uart.uartdr.write(|w| unsafe { w.data().bits(byte) });
    }
}

impl fmt::Write for Uart0 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Integer and 6-bit fractional baud divisors (RP2040 datasheet 4.2.7.1).
fn baud_divisors(clk_peri_hz: u32, baud: u32) -> (u16, u8) {
    let div = 8 * clk_peri_hz / baud;
    let ibrd = div >> 7;
    if ibrd == 0 {
        (1, 0)
    } else if ibrd >= 0xffff {
        (0xffff, 0)
    } else {
        (ibrd as u16, (((div & 0x7f) + 1) / 2) as u8)
    }
}
