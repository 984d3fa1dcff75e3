//! Capture backend driving headless Chromium over the DevTools protocol.
//!
//! Each call opens a fresh tab, loads the card document from a `data:` URL,
//! waits for the `#card` element, and either reads its border box or
//! screenshots exactly that box. The page background is overridden to fully
//! transparent so rounded corners and the area outside the card keep alpha.
//!
//! Cards taller than the browser window are clipped; the window is sized
//! generously for that reason.

use super::backend::{BackendError, CaptureBackend, Dimensions};
use crate::card::CARD_ELEMENT_ID;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use headless_chrome::protocol::cdp::{DOM, Emulation, Page};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;

/// Browser window size used for layout. Wider than any theme's card.
const WINDOW_SIZE: (u32, u32) = (1280, 4000);

pub struct ChromeBackend {
    browser: Browser,
}

fn capture_failed(e: impl std::fmt::Display) -> BackendError {
    BackendError::CaptureFailed(e.to_string())
}

impl ChromeBackend {
    /// Launch a headless browser. Fails when no Chrome/Chromium is installed.
    pub fn launch() -> Result<Self, BackendError> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            window_size: Some(WINDOW_SIZE),
            ..Default::default()
        })
        .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        tracing::debug!("headless browser launched");
        Ok(Self { browser })
    }

    /// Open `document` in a new tab with a transparent page background.
    fn load(&self, document: &str) -> Result<Arc<Tab>, BackendError> {
        let tab = self.browser.new_tab().map_err(capture_failed)?;
        tab.call_method(Emulation::SetDefaultBackgroundColorOverride {
            color: Some(DOM::RGBA {
                r: 0,
                g: 0,
                b: 0,
                a: Some(0.0),
            }),
        })
        .map_err(capture_failed)?;

        let url = format!("data:text/html;base64,{}", STANDARD.encode(document));
        tab.navigate_to(&url)
            .map_err(capture_failed)?
            .wait_until_navigated()
            .map_err(capture_failed)?;
        Ok(tab)
    }

    fn card_box(tab: &Tab) -> Result<Page::Viewport, BackendError> {
        let selector = format!("#{CARD_ELEMENT_ID}");
        let element = tab.wait_for_element(&selector).map_err(capture_failed)?;
        let model = element.get_box_model().map_err(capture_failed)?;
        Ok(model.border_viewport())
    }

    fn close(tab: &Tab) {
        if let Err(e) = tab.close(true) {
            tracing::debug!(error = %e, "failed to close capture tab");
        }
    }
}

impl CaptureBackend for ChromeBackend {
    fn measure(&self, document: &str) -> Result<Dimensions, BackendError> {
        let tab = self.load(document)?;
        let viewport = Self::card_box(&tab);
        Self::close(&tab);
        let viewport = viewport?;
        Ok(Dimensions {
            width: viewport.width.ceil() as u32,
            height: viewport.height.ceil() as u32,
        })
    }

    fn capture_png(&self, document: &str, pixel_ratio: f32) -> Result<Vec<u8>, BackendError> {
        let tab = self.load(document)?;
        let shot = Self::card_box(&tab).and_then(|mut clip| {
            clip.scale = f64::from(pixel_ratio);
            tab.capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(capture_failed)
        });
        Self::close(&tab);
        let png = shot?;
        tracing::debug!(pixel_ratio, size = png.len(), "card captured");
        Ok(png)
    }
}
