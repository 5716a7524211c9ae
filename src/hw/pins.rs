// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 stepper controller board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, gpioe, Alternate, Input, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub usart2: Usart2Pins,
    pub driver: DriverPins,
    pub fan: gpiod::PD7<Output<PushPull>>,
    pub buttons: ButtonPins,
}

pub struct LedPins {
    /// Step clock falling behind
    pub load: gpiod::PD9<Output<PushPull>>,
    pub power: gpiod::PD10<Output<PushPull>>,
}

/// USART1 TX/RX (debug console)
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// USART2 TX/RX (display; RX unused)
pub struct Usart2Pins {
    pub tx: gpiod::PD5<Alternate<7>>,
    pub rx: gpiod::PD6<Alternate<7>>,
}

/// Stepper driver stage. Winding pins start on their TIM4 function; `DriverPort` switches them.
pub struct DriverPins {
    pub a1: gpiod::PD12<Alternate<2>>, // TIM4_CH1 (PWM)
    pub b1: gpiod::PD13<Alternate<2>>, // TIM4_CH2 (PWM)
    pub a2: gpiod::PD14<Alternate<2>>, // TIM4_CH3 (PWM)
    pub b2: gpiod::PD15<Alternate<2>>, // TIM4_CH4 (PWM)
    pub enable: gpiod::PD11<Output<PushPull>>,
}

/// Front panel buttons, active low
pub struct ButtonPins {
    pub start_stop: gpioe::PE2<Input<PullUp>>,
    pub down: gpioe::PE3<Input<PullUp>>,
    pub up: gpioe::PE5<Input<PullUp>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                load: gpiod.pd9.into_push_pull_output(),
                power: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            usart2: Usart2Pins {
                tx: gpiod.pd5.into_alternate::<7>(),
                rx: gpiod.pd6.into_alternate::<7>(),
            },

            driver: DriverPins {
                a1: gpiod.pd12.into_alternate::<2>(),
                b1: gpiod.pd13.into_alternate::<2>(),
                a2: gpiod.pd14.into_alternate::<2>(),
                b2: gpiod.pd15.into_alternate::<2>(),
                enable: gpiod.pd11.into_push_pull_output(),
            },

            fan: gpiod.pd7.into_push_pull_output(),

            buttons: ButtonPins {
                start_stop: gpioe.pe2.into_pull_up_input(),
                down: gpioe.pe3.into_pull_up_input(),
                up: gpioe.pe5.into_pull_up_input(),
            },
        }
    }
}
