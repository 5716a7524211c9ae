// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use core::fmt::Write as _;

    use cortex_m_rt::entry;
    use panic_halt as _;

    use hal::{
        pac,
        prelude::*,
        serial::{Config, Serial},
    };
    use stm32f7xx_hal as hal;

    use stepdrive::app::{App, Panel};
    use stepdrive::config::{
        CONSOLE_BAUD, DISPLAY_BAUD, DISPLAY_POWER_UP_BAUD, DISPLAY_POWER_UP_MS, DRIVE_MODE,
        ENABLE_OUTPUT, MAX_RPM, MOTOR_DUTY_PERCENT, MOTOR_PWM_HZ, SPLASH_MS, STEPS_PER_REV,
        WINDING_OUTPUTS,
    };
    use stepdrive::drivers::NhdK3z;
    use stepdrive::hw::flash::FlashStore;
    use stepdrive::hw::gpio::DriverPort;
    use stepdrive::hw::pins::BoardPins;
    use stepdrive::hw::pwm::WindingPwm;
    use stepdrive::hw::timer::MicrosTimer;
    use stepdrive::hw::{usart, Led, Monotonic, Usart};
    use stepdrive::motors::Stepper;

    /// Busy-wait on the microsecond timer.
    fn wait_ms<C: Monotonic>(clock: &C, ms: u32) {
        let until = clock.now_us() + ms as u64 * 1_000;
        while clock.now_us() < until {
            cortex_m::asm::nop();
        }
    }

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();

        // GPIO
        let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE);

        // LED
        let mut power_led = Led::active_low(pins.leds.power);
        let load_led = Led::active_low(pins.leds.load);
        power_led.on();

        // USART1 (DBG)
        let usart_cfg = Config {
            baud_rate: CONSOLE_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(
            dp.USART1,
            (pins.usart1.tx, pins.usart1.rx),
            &clocks,
            usart_cfg,
        );
        let (tx, _rx) = serial.split();
        let mut console = Usart::new(tx);
        console.println("Booting...");

        // TIM2 (time base)
        let timer = MicrosTimer::tim2(dp.TIM2, &clocks);

        // Wait for display to power up
        wait_ms(&timer, DISPLAY_POWER_UP_MS);

        // Settings
        let store = FlashStore::new(dp.FLASH);

        // TIM4 (winding PWM) and driver stage
        let pwm = WindingPwm::tim4(dp.TIM4, &clocks, MOTOR_PWM_HZ, MOTOR_DUTY_PERCENT);
        let _ = write!(console, "Winding PWM {:?}\r\n", pwm.timing());

        let port = DriverPort::new(pins.driver);
        let mut motor = Stepper::new(
            STEPS_PER_REV,
            MAX_RPM,
            DRIVE_MODE,
            Some(ENABLE_OUTPUT),
            port,
            &timer,
        );
        for output in WINDING_OUTPUTS {
            if let Err(e) = motor.register_winding(output, true) {
                let _ = write!(console, "Winding on PD{} rejected: {:?}\r\n", output, e);
            }
        }

        // USART2 (display): powers up slow, then switched to the fast rate
        let display_cfg = Config {
            baud_rate: DISPLAY_POWER_UP_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(
            dp.USART2,
            (pins.usart2.tx, pins.usart2.rx),
            &clocks,
            display_cfg,
        );
        let (tx, _rx) = serial.split();
        let mut display = NhdK3z::new(tx);
        let bps = display.set_baud(DISPLAY_BAUD);
        usart::retune_usart2(&clocks, bps);

        // Front panel
        let buttons = pins.buttons;
        let mut panel = Panel::new(buttons.up, buttons.down, buttons.start_stop);

        let mut app = App::new(motor, display, store, pins.fan, load_led, console);
        app.splash();
        wait_ms(&timer, SPLASH_MS);
        app.boot();

        loop {
            let input = panel.update(timer.now_us());
            app.tick(&input);
        }
    }
}

/// The firmware only runs on the MCU; host builds exist for the library tests.
#[cfg(not(target_os = "none"))]
fn main() {}
