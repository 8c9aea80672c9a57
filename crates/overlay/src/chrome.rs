//! Visibility of transient overlay UI

/// Which transient UI elements are currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayChrome {
    pub selection_outline: bool,
    pub size_label: bool,
    pub toolbar: bool,
    pub mask: bool,
    pub result_overlay: bool,
}

impl Default for OverlayChrome {
    fn default() -> Self {
        Self {
            selection_outline: true,
            size_label: true,
            toolbar: true,
            mask: true,
            result_overlay: true,
        }
    }
}

impl OverlayChrome {
    pub fn hidden() -> Self {
        Self {
            selection_outline: false,
            size_label: false,
            toolbar: false,
            mask: false,
            result_overlay: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        *self == Self::hidden()
    }
}

/// Hides all chrome for the duration of a capture and restores the previous
/// state on drop, including when the capture bails out early.
pub struct ChromeGuard<'a> {
    chrome: &'a mut OverlayChrome,
    saved: OverlayChrome,
}

impl<'a> ChromeGuard<'a> {
    pub fn hide(chrome: &'a mut OverlayChrome) -> Self {
        let saved = *chrome;
        *chrome = OverlayChrome::hidden();
        Self { chrome, saved }
    }

    pub fn chrome(&self) -> &OverlayChrome {
        self.chrome
    }
}

impl Drop for ChromeGuard<'_> {
    fn drop(&mut self) {
        *self.chrome = self.saved;
    }
}
