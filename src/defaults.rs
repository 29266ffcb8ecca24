//! Default bindings for never-seen controllers
//!
//! The controller type is guessed from the display name; everything else is
//! a fixed layout per type.

use crate::binding::{
    BindingConfig, ControllerType, GamepadInputId, LedConfig, LeftJoyconButtons, MotionBackend,
    MotionConfig, RightJoyconButtons, RumbleConfig, StandardBinding, StickConfig, StickInputId,
};
use crate::error::Result;
use tracing::trace;

/// Supplies a complete binding for a device that has no saved configuration
pub trait BindingDefaultsProvider: Send + Sync {
    fn default_binding_for(&self, display_name: &str) -> Result<BindingConfig>;
}

/// Infer the emulated controller layout from a display name
///
/// Only single Nintendo Joy-Cons get a dedicated layout; paired Joy-Cons
/// (`(L/R)`), Pro Controllers and every non-Nintendo pad use Pro-Controller
/// defaults.
pub fn infer_controller_type(display_name: &str) -> ControllerType {
    if display_name.contains("Nintendo") && !display_name.contains("(L/R)") {
        if display_name.contains("(L)") {
            return ControllerType::JoyconLeft;
        }
        if display_name.contains("(R)") {
            return ControllerType::JoyconRight;
        }
    }
    ControllerType::ProController
}

/// Provider producing Switch-style layouts
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchDefaults;

impl BindingDefaultsProvider for SwitchDefaults {
    fn default_binding_for(&self, display_name: &str) -> Result<BindingConfig> {
        let controller_type = infer_controller_type(display_name);
        trace!(display_name, ?controller_type, "Building default binding");
        Ok(standard_binding(controller_type))
    }
}

/// Build the default standard binding for a controller type
pub fn standard_binding(controller_type: ControllerType) -> BindingConfig {
    use GamepadInputId as G;

    let left = controller_type == ControllerType::JoyconLeft;
    let right = controller_type == ControllerType::JoyconRight;
    let pick = |cond: bool, yes: G, no: G| if cond { yes } else { no };

    BindingConfig::Standard(StandardBinding {
        controller_type,
        deadzone_left: 0.1,
        deadzone_right: 0.1,
        range_left: 1.0,
        range_right: 1.0,
        trigger_threshold: 0.5,
        // A sideways Joy-Con L exposes its d-pad as the face buttons
        left_joycon: LeftJoyconButtons {
            dpad_up: pick(left, G::Y, G::DpadUp),
            dpad_down: pick(left, G::A, G::DpadDown),
            dpad_left: pick(left, G::B, G::DpadLeft),
            dpad_right: pick(left, G::X, G::DpadRight),
            button_minus: pick(left, G::Plus, G::Minus),
            button_l: G::LeftShoulder,
            button_zl: G::LeftTrigger,
            button_sl: pick(left, G::LeftShoulder, G::Unbound),
            button_sr: pick(left, G::RightShoulder, G::Unbound),
        },
        left_stick: StickConfig {
            joystick: StickInputId::Left,
            stick_button: G::LeftStick,
            invert_stick_x: false,
            invert_stick_y: false,
            rotate90_cw: left,
        },
        right_joycon: RightJoyconButtons {
            button_a: G::B,
            button_b: pick(right, G::Y, G::A),
            button_x: pick(right, G::A, G::Y),
            button_y: G::X,
            button_plus: G::Plus,
            button_r: G::RightShoulder,
            button_zr: G::RightTrigger,
            button_sl: pick(right, G::LeftShoulder, G::Unbound),
            button_sr: pick(right, G::RightShoulder, G::Unbound),
        },
        // A single Joy-Con R only has one physical stick, reported as "left"
        right_stick: StickConfig {
            joystick: if right { StickInputId::Left } else { StickInputId::Right },
            stick_button: G::RightStick,
            invert_stick_x: right,
            invert_stick_y: right,
            rotate90_cw: right,
        },
        motion: MotionConfig {
            backend: MotionBackend::GamepadDriver,
            enable_motion: true,
            sensitivity: 100,
            gyro_deadzone: 1.0,
        },
        rumble: RumbleConfig {
            strong_rumble: 1.0,
            weak_rumble: 1.0,
            enable_rumble: false,
        },
        led: LedConfig {
            enable_led: true,
            turn_off_led: false,
            use_rainbow: false,
            led_color: 0,
        },
    })
}
