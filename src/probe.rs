/// Accessibility text extraction at a screen coordinate.
///
/// Implementations must swallow platform errors: any failure is reported as
/// `None` so the sampling loop never sees an extraction error.
pub trait TextProbe: Send + Sync {
    fn text_at(&self, x: i32, y: i32) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct DefaultTextProbe;

impl TextProbe for DefaultTextProbe {
    #[cfg(windows)]
    fn text_at(&self, x: i32, y: i32) -> Option<String> {
        probe_uia(x, y)
    }

    #[cfg(not(windows))]
    fn text_at(&self, _x: i32, _y: i32) -> Option<String> {
        None
    }
}

#[cfg(windows)]
fn probe_uia(x: i32, y: i32) -> Option<String> {
    use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

    unsafe {
        if CoInitializeEx(None, COINIT_APARTMENTTHREADED).is_err() {
            return None;
        }
        let text = element_text_at(x, y);
        CoUninitialize();
        text
    }
}

#[cfg(windows)]
unsafe fn element_text_at(x: i32, y: i32) -> Option<String> {
    use tracing::debug;
    use windows::Win32::Foundation::POINT;
    use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER};
    use windows::Win32::UI::Accessibility::{
        CUIAutomation, IUIAutomation, IUIAutomationValuePattern, UIA_ValuePatternId,
    };

    let automation: IUIAutomation =
        match CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER) {
            Ok(a) => a,
            Err(e) => {
                debug!(?e, "failed to create UIAutomation instance");
                return None;
            }
        };
    let element = match automation.ElementFromPoint(POINT { x, y }) {
        Ok(el) => el,
        Err(e) => {
            debug!(?e, "no accessibility element under the pointer");
            return None;
        }
    };

    // Prefer the element name (labels, buttons, titles); fall back to the
    // value pattern for edit controls.
    let mut text = element
        .CurrentName()
        .map(|name| name.to_string())
        .unwrap_or_default();
    if text.trim().is_empty() {
        if let Ok(pattern) =
            element.GetCurrentPatternAs::<IUIAutomationValuePattern>(UIA_ValuePatternId)
        {
            text = pattern
                .CurrentValue()
                .map(|value| value.to_string())
                .unwrap_or_default();
        }
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
