//! Per-player binding configuration
//!
//! The assignment engine treats bindings as opaque values that are carried
//! over or freshly generated. The only field it touches is the LED color,
//! which exists on the standard (gamepad) variant alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Controller layout the binding emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerType {
    ProController,
    JoyconLeft,
    JoyconRight,
    JoyconPair,
    Handheld,
}

/// Physical gamepad input a logical button is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamepadInputId {
    Unbound,
    A,
    B,
    X,
    Y,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Minus,
    Plus,
    Guide,
}

/// Physical stick a logical stick reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickInputId {
    Unbound,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftJoyconButtons {
    pub dpad_up: GamepadInputId,
    pub dpad_down: GamepadInputId,
    pub dpad_left: GamepadInputId,
    pub dpad_right: GamepadInputId,
    pub button_minus: GamepadInputId,
    pub button_l: GamepadInputId,
    pub button_zl: GamepadInputId,
    pub button_sl: GamepadInputId,
    pub button_sr: GamepadInputId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightJoyconButtons {
    pub button_a: GamepadInputId,
    pub button_b: GamepadInputId,
    pub button_x: GamepadInputId,
    pub button_y: GamepadInputId,
    pub button_plus: GamepadInputId,
    pub button_r: GamepadInputId,
    pub button_zr: GamepadInputId,
    pub button_sl: GamepadInputId,
    pub button_sr: GamepadInputId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickConfig {
    pub joystick: StickInputId,
    pub stick_button: GamepadInputId,
    pub invert_stick_x: bool,
    pub invert_stick_y: bool,
    pub rotate90_cw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionBackend {
    GamepadDriver,
    CemuHook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    pub backend: MotionBackend,
    pub enable_motion: bool,
    pub sensitivity: u32,
    pub gyro_deadzone: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RumbleConfig {
    pub strong_rumble: f32,
    pub weak_rumble: f32,
    pub enable_rumble: bool,
}

/// Controller LED settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedConfig {
    /// Let the emulator drive the LED color
    pub enable_led: bool,
    /// Ignore the color and switch the LED off
    pub turn_off_led: bool,
    pub use_rainbow: bool,
    /// Packed ARGB color
    pub led_color: u32,
}

/// Full layout for a gamepad-backed player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardBinding {
    pub controller_type: ControllerType,
    pub deadzone_left: f32,
    pub deadzone_right: f32,
    pub range_left: f32,
    pub range_right: f32,
    pub trigger_threshold: f32,
    pub left_joycon: LeftJoyconButtons,
    pub left_stick: StickConfig,
    pub right_joycon: RightJoyconButtons,
    pub right_stick: StickConfig,
    pub motion: MotionConfig,
    pub rumble: RumbleConfig,
    pub led: LedConfig,
}

/// Keyboard-backed player: logical button name -> key name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardBinding {
    pub controller_type: ControllerType,
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// Binding kinds a slot can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingConfig {
    Standard(StandardBinding),
    Keyboard(KeyboardBinding),
}

impl BindingConfig {
    /// Pro-Controller layout used whenever classification fails
    pub fn generic() -> Self {
        crate::defaults::standard_binding(ControllerType::ProController)
    }

    pub fn controller_type(&self) -> ControllerType {
        match self {
            Self::Standard(b) => b.controller_type,
            Self::Keyboard(b) => b.controller_type,
        }
    }

    /// LED color, if this binding drives an enabled LED
    ///
    /// `turn_off_led` wins over any assigned color.
    pub fn led_color(&self) -> Option<u32> {
        match self {
            Self::Standard(b) if b.led.enable_led && !b.led.turn_off_led => Some(b.led.led_color),
            _ => None,
        }
    }

    /// Set or clear the LED color. Non-standard bindings are left untouched.
    ///
    /// Returns `true` if the binding carries an LED.
    pub fn set_led_color(&mut self, color: Option<u32>) -> bool {
        let Self::Standard(b) = self else {
            return false;
        };
        match color {
            Some(c) => {
                b.led.enable_led = true;
                b.led.led_color = c;
            }
            None => {
                b.led.enable_led = false;
                b.led.led_color = 0;
            }
        }
        true
    }
}
