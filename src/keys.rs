/// Polled keyboard state. The quit combination is checked once per sampling
/// tick rather than through a low-level hook, so a missed tick only delays
/// shutdown by one period.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub vk: u32,
}

/// Parse a combo string like "Ctrl+Q" into a [`KeyCombo`].
pub fn parse_combo(s: &str) -> Option<KeyCombo> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut vk: Option<u32> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => match virtual_key_from_string(&upper) {
                Some(code) => vk = Some(code),
                None => return None,
            },
        }
    }

    vk.map(|vk| KeyCombo {
        ctrl,
        shift,
        alt,
        vk,
    })
}

fn virtual_key_from_string(upper: &str) -> Option<u32> {
    match upper {
        "ESC" | "ESCAPE" => Some(0x1B),
        "SPACE" => Some(0x20),
        "TAB" => Some(0x09),
        "ENTER" | "RETURN" => Some(0x0D),
        "BACKSPACE" => Some(0x08),
        "DELETE" => Some(0x2E),
        _ if upper.starts_with('F') && upper.len() > 1 => {
            match upper[1..].parse::<u32>() {
                Ok(n) if (1..=12).contains(&n) => Some(0x70 + n - 1),
                _ => None,
            }
        }
        _ if upper.len() == 1 => {
            let c = upper.chars().next()?;
            // Letter and digit virtual-key codes match their ASCII values.
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                Some(c as u32)
            } else {
                None
            }
        }
        _ => None,
    }
}

pub trait KeyStateProvider: Send + Sync {
    fn combo_pressed(&self, combo: &KeyCombo) -> bool;
}

#[derive(Debug, Default)]
pub struct DefaultKeyStateProvider;

impl KeyStateProvider for DefaultKeyStateProvider {
    #[cfg(windows)]
    fn combo_pressed(&self, combo: &KeyCombo) -> bool {
        use windows::Win32::UI::Input::KeyboardAndMouse::{VK_CONTROL, VK_MENU, VK_SHIFT};

        (!combo.ctrl || key_down(VK_CONTROL.0 as u32))
            && (!combo.shift || key_down(VK_SHIFT.0 as u32))
            && (!combo.alt || key_down(VK_MENU.0 as u32))
            && key_down(combo.vk)
    }

    #[cfg(not(windows))]
    fn combo_pressed(&self, _combo: &KeyCombo) -> bool {
        false
    }
}

#[cfg(windows)]
fn key_down(vk: u32) -> bool {
    use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    unsafe { (GetAsyncKeyState(vk as i32) as u16 & 0x8000) != 0 }
}
