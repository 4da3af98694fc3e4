//! Map camera: drag to pan, pinch/wheel to zoom, never showing empty space
//! past the edges of the map image.
//!
//! World coordinates place the map below a fixed header, so vertical scroll
//! is offset by `header` (the map's top edge sits at `y = header`).

use serde::Serialize;

use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
    view_w: f64,
    view_h: f64,
    world_w: f64,
    world_h: f64,
    header: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Camera {
    /// Camera for the configured map, zoomed out as far as the map allows
    /// and centred on it.
    pub fn new(cfg: &GameConfig) -> Self {
        let view_w = cfg.canvas_width;
        let view_h = (cfg.canvas_height - cfg.header_height).max(1.0);
        let min_zoom = cfg.min_zoom.max(cover_zoom(view_w, view_h, cfg.map_width, cfg.map_height));
        let max_zoom = cfg.max_zoom.max(min_zoom);
        let mut cam = Self {
            scroll_x: 0.0,
            scroll_y: cfg.header_height,
            zoom: min_zoom,
            view_w,
            view_h,
            world_w: cfg.map_width,
            world_h: cfg.map_height,
            header: cfg.header_height,
            min_zoom,
            max_zoom,
        };
        cam.center_on(cfg.map_width / 2.0, cfg.header_height + cfg.map_height / 2.0);
        cam
    }

    /// Effective zoom range after raising the floor to the cover zoom.
    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Visible world-space size at the current zoom.
    pub fn visible_size(&self) -> (f64, f64) {
        (self.view_w / self.zoom, self.view_h / self.zoom)
    }

    /// Largest scroll values that still keep the map edge on screen.
    pub fn max_scroll(&self) -> (f64, f64) {
        let (vw, vh) = self.visible_size();
        (
            (self.world_w - vw).max(0.0),
            self.header + (self.world_h - vh).max(0.0),
        )
    }

    pub fn clamp(&mut self) {
        let (max_x, max_y) = self.max_scroll();
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(self.header, max_y);
    }

    /// Pan by a screen-space pointer delta (pointer moved by `dx, dy`).
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.scroll_x -= dx / self.zoom;
        self.scroll_y -= dy / self.zoom;
        self.clamp();
    }

    /// Multiply zoom by `factor`, keeping the view centre fixed.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (cx, cy) = self.center();
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.center_on(cx, cy);
    }

    pub fn center(&self) -> (f64, f64) {
        let (vw, vh) = self.visible_size();
        (self.scroll_x + vw / 2.0, self.scroll_y + vh / 2.0)
    }

    pub fn center_on(&mut self, x: f64, y: f64) {
        let (vw, vh) = self.visible_size();
        self.scroll_x = x - vw / 2.0;
        self.scroll_y = y - vh / 2.0;
        self.clamp();
    }
}

/// Smallest zoom at which the map fills the whole view.
fn cover_zoom(view_w: f64, view_h: f64, world_w: f64, world_h: f64) -> f64 {
    if world_w <= 0.0 || world_h <= 0.0 {
        return 1.0;
    }
    (view_w / world_w).max(view_h / world_h)
}
