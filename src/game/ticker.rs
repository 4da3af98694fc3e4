// 1 Hz `setInterval` ticker for the browser runtime.
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::run::Ticker;

pub const TICK_INTERVAL_MS: i32 = 1000;

/// The callback closure is created once and lives as long as the ticker;
/// stopping only clears the interval, so a tick that stops its own timer
/// never drops the closure it is running in.
pub struct IntervalTicker {
    callback: Closure<dyn FnMut()>,
    handle: Option<i32>,
}

impl IntervalTicker {
    pub fn new(on_tick: impl FnMut() + 'static) -> Self {
        Self {
            callback: Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self) {
        self.stop();
        let Some(w) = window() else {
            warn!("no window; level timer not started");
            return;
        };
        match w.set_interval_with_callback_and_timeout_and_arguments_0(
            self.callback.as_ref().unchecked_ref(),
            TICK_INTERVAL_MS,
        ) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => warn!("setInterval failed: {e:?}"),
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(w) = window() {
                w.clear_interval_with_handle(handle);
            }
        }
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
