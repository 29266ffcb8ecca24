//! Player LED colors
//!
//! Colors depend only on the final slot index, never on which device holds
//! the slot.

use super::types::SlotBinding;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Player colors in slot order (packed ARGB)
pub const PLAYER_COLORS: [u32; 8] = [
    0xFFFF0000, // Player 1 - Red
    0xFF0000FF, // Player 2 - Blue
    0xFF00FF00, // Player 3 - Green
    0xFFFFFF00, // Player 4 - Yellow
    0xFFFF00FF, // Player 5 - Magenta
    0xFFFFA500, // Player 6 - Orange
    0xFF00FFFF, // Player 7 - Cyan
    0xFF800080, // Player 8 - Purple
];

/// What slots past the end of the palette get
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedOverflow {
    /// LED disabled, no color
    #[default]
    Colorless,
    /// Restart the palette from the first color
    Wrap,
}

/// Color for a slot index under the given overflow policy
pub fn color_for_slot(slot_index: usize, overflow: LedOverflow) -> Option<u32> {
    match PLAYER_COLORS.get(slot_index) {
        Some(color) => Some(*color),
        None => match overflow {
            LedOverflow::Colorless => None,
            LedOverflow::Wrap => Some(PLAYER_COLORS[slot_index % PLAYER_COLORS.len()]),
        },
    }
}

/// Stamp each LED-capable binding with the color of its slot
pub fn assign_colors(mut bindings: Vec<SlotBinding>, overflow: LedOverflow) -> Vec<SlotBinding> {
    for slot in &mut bindings {
        let color = color_for_slot(slot.slot_index, overflow);
        if slot.binding.set_led_color(color) {
            trace!(player = slot.slot_index + 1, color = ?color.map(|c| format!("{:08X}", c)), "Set LED color");
        }
    }
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingConfig, ControllerType, KeyboardBinding};

    fn pad(index: usize) -> SlotBinding {
        SlotBinding::new(index, format!("pad{}", index), BindingConfig::generic())
    }

    #[test]
    fn test_palette_by_index() {
        let colored = assign_colors((0..8).map(pad).collect(), LedOverflow::Colorless);
        let colors: Vec<_> = colored.iter().map(|b| b.led_color().unwrap()).collect();
        assert_eq!(colors, PLAYER_COLORS.to_vec());
    }

    #[test]
    fn test_color_follows_index_not_position() {
        let colored = assign_colors(vec![pad(2), pad(5)], LedOverflow::Colorless);
        assert_eq!(colored[0].led_color(), Some(0xFF00FF00));
        assert_eq!(colored[1].led_color(), Some(0xFFFFA500));
    }

    #[test]
    fn test_overflow_policies() {
        assert_eq!(color_for_slot(8, LedOverflow::Colorless), None);
        assert_eq!(color_for_slot(8, LedOverflow::Wrap), Some(0xFFFF0000));

        let colored = assign_colors(vec![pad(8)], LedOverflow::Colorless);
        assert_eq!(colored[0].led_color(), None);
    }

    #[test]
    fn test_switched_off_led_stays_dark() {
        let mut slot = pad(0);
        if let BindingConfig::Standard(b) = &mut slot.binding {
            b.led.turn_off_led = true;
        }
        let colored = assign_colors(vec![slot], LedOverflow::Wrap);
        assert_eq!(colored[0].led_color(), None);
    }

    #[test]
    fn test_keyboard_binding_untouched() {
        let keyboard = BindingConfig::Keyboard(KeyboardBinding {
            controller_type: ControllerType::ProController,
            keys: Default::default(),
        });
        let colored = assign_colors(vec![SlotBinding::new(0, "0", keyboard.clone())], LedOverflow::Wrap);
        assert_eq!(colored[0].binding, keyboard);
    }
}
