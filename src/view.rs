//! Render View
//!
//! The camera-side description of the view being rendered: matrices, clip
//! planes, output size, and the feature flags the host enabled for it.

use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};

bitflags! {
    /// Features requested for a view.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u32 {
        /// Global illumination; required for full-scene augmented tracing.
        const GI = 1 << 0;
    }
}

/// A view being rendered this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    /// World → view transform.
    pub view: Mat4,
    /// View → clip transform.
    pub projection: Mat4,
    pub near: f32,
    pub far: f32,
    /// Output size in pixels.
    pub width: u32,
    pub height: u32,
    pub flags: ViewFlags,
}

impl RenderView {
    #[must_use]
    pub fn new(view: Mat4, projection: Mat4, near: f32, far: f32, width: u32, height: u32) -> Self {
        Self {
            view,
            projection,
            near,
            far,
            width,
            height,
            flags: ViewFlags::default(),
        }
    }

    /// Right-handed perspective view looking from `eye` towards `target`.
    #[must_use]
    pub fn perspective(
        eye: Vec3,
        target: Vec3,
        fov_y_radians: f32,
        near: f32,
        far: f32,
        width: u32,
        height: u32,
    ) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self::new(
            Mat4::look_at_rh(eye, target, Vec3::Y),
            Mat4::perspective_rh(fov_y_radians, aspect, near, far),
            near,
            far,
            width,
            height,
        )
    }

    /// Right-handed orthographic view looking from `eye` towards `target`.
    #[must_use]
    pub fn orthographic(
        eye: Vec3,
        target: Vec3,
        half_height: f32,
        near: f32,
        far: f32,
        width: u32,
        height: u32,
    ) -> Self {
        let half_width = half_height * width.max(1) as f32 / height.max(1) as f32;
        Self::new(
            Mat4::look_at_rh(eye, target, Vec3::Y),
            Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, near, far),
            near,
            far,
            width,
            height,
        )
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ViewFlags) -> Self {
        self.flags = flags;
        self
    }

    /// An orthographic projection keeps `w = 1` for every point.
    #[inline]
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        (self.projection.w_axis.w - 1.0).abs() < f32::EPSILON
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space camera position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Depth reconstruction constants:
    /// `(1 / P00, 1 / P11, far / (far - near), -far * near / (far - near) / far)`.
    #[must_use]
    pub fn view_info(&self) -> Vec4 {
        let range = self.far - self.near;
        Vec4::new(
            1.0 / self.projection.x_axis.x,
            1.0 / self.projection.y_axis.y,
            self.far / range,
            (-self.far * self.near) / range / self.far,
        )
    }

    /// `(width, height, 1 / width, 1 / height)`.
    #[must_use]
    pub fn screen_size(&self) -> Vec4 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        Vec4::new(w, h, 1.0 / w, 1.0 / h)
    }
}
