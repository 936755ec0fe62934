//! Fly camera: position + yaw/pitch, a perspective projection and a
//! keyboard/mouse controller.
//!
//! Yaw is measured from +X towards +Z, pitch from the XZ plane towards +Y, so
//! a yaw of -90° looks down -Z.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// A camera at `position` looking along `direction`. Roll is always zero.
    pub fn looking_at(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
        Self {
            position,
            yaw: Rad(direction.z.atan2(direction.x)),
            pitch: Rad(direction.y.atan2(horizontal)),
        }
    }

    /// Unit vector the camera looks along.
    pub fn direction(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.direction(), Vector3::unit_y())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// What a scene needs from the camera to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub position: Point3<f32>,
    pub view_proj: Matrix4<f32>,
}

impl CameraView {
    pub fn new(camera: &Camera, projection: &Projection) -> Self {
        Self {
            position: camera.position,
            view_proj: projection.calc_matrix() * camera.calc_matrix(),
        }
    }
}

/// Fly controller: WASD to move, Space/Q up, E/C down, drag with the right
/// mouse button to look around, Ctrl to move faster.
///
/// Shift is left to the scene controls, where it reverses a cycle.
/// `sensitivity` is in radians per pixel of mouse motion.
#[derive(Debug)]
pub struct CameraController {
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    looking: bool,
    fast: bool,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            looking: false,
            fast: false,
            speed,
            sensitivity,
        }
    }

    /// Returns whether the event was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.handle_key(*code, *state),
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.looking = state.is_pressed();
                true
            }
            WindowEvent::Focused(false) => {
                self.release_all();
                false
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        let amount = if state.is_pressed() { 1.0 } else { 0.0 };
        match code {
            KeyCode::KeyW => self.amount_forward = amount,
            KeyCode::KeyS => self.amount_backward = amount,
            KeyCode::KeyA => self.amount_left = amount,
            KeyCode::KeyD => self.amount_right = amount,
            KeyCode::Space | KeyCode::KeyQ => self.amount_up = amount,
            KeyCode::KeyE | KeyCode::KeyC => self.amount_down = amount,
            KeyCode::ControlLeft | KeyCode::ControlRight => self.fast = state.is_pressed(),
            _ => return false,
        }
        true
    }

    /// Raw mouse motion. Only turns the camera while the look button is held.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if self.looking {
            self.rotate_horizontal += dx as f32;
            self.rotate_vertical += dy as f32;
        }
    }

    fn release_all(&mut self) {
        let (speed, sensitivity) = (self.speed, self.sensitivity);
        *self = Self::new(speed, sensitivity);
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let speed = if self.fast { self.speed * 4.0 } else { self.speed };

        let (yaw_sin, yaw_cos) = camera.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin).normalize();
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos).normalize();
        camera.position += forward * (self.amount_forward - self.amount_backward) * speed * dt;
        camera.position += right * (self.amount_right - self.amount_left) * speed * dt;
        camera.position.y += (self.amount_up - self.amount_down) * speed * dt;

        // Mouse deltas accumulate between frames, so they are not scaled by dt.
        camera.yaw += Rad(self.rotate_horizontal) * self.sensitivity;
        camera.pitch += Rad(-self.rotate_vertical) * self.sensitivity;
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        camera.pitch = Rad(camera.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Vector4};

    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn direction_survives_yaw_pitch_round_trip() {
        for direction in [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(2.0, 0.5, 1.0),
        ] {
            let camera = Camera::looking_at(Point3::new(0.0, 0.0, 0.0), direction);
            assert_close(camera.direction(), direction.normalize());
        }
    }

    #[test]
    fn looking_down_negative_z_is_minus_ninety_yaw() {
        let camera = Camera::looking_at(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let yaw: Deg<f32> = camera.yaw.into();
        assert!((yaw.0 + 90.0).abs() < 1e-4);
        assert!(camera.pitch.0.abs() < 1e-6);
    }

    #[test]
    fn point_in_front_of_camera_lands_in_clip_volume() {
        let camera = Camera::looking_at(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
        let view = CameraView::new(&camera, &projection);
        let clip = view.view_proj * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn controller_moves_forward_and_clamps_pitch() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
        let mut controller = CameraController::new(2.0, 1.0);
        controller.handle_key(KeyCode::KeyW, ElementState::Pressed);
        controller.update(&mut camera, Duration::from_secs(1));
        assert_close(camera.position.to_homogeneous().truncate(), Vector3::new(0.0, 0.0, -2.0));

        controller.handle_key(KeyCode::KeyW, ElementState::Released);
        controller.looking = true;
        controller.handle_mouse(0.0, -10_000.0);
        controller.update(&mut camera, Duration::from_secs(1));
        assert!(camera.pitch.0 <= SAFE_FRAC_PI_2);
        assert_close(camera.position.to_homogeneous().truncate(), Vector3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn mouse_look_does_not_depend_on_frame_time() {
        let mut slow = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut fast = slow;
        let mut controller = CameraController::new(1.0, 0.01);
        controller.looking = true;

        controller.handle_mouse(50.0, 0.0);
        controller.update(&mut slow, Duration::from_millis(100));
        controller.handle_mouse(50.0, 0.0);
        controller.update(&mut fast, Duration::from_millis(5));

        assert!((slow.yaw.0 - 0.5).abs() < 1e-6);
        assert_eq!(slow.yaw, fast.yaw);
    }

    #[test]
    fn shift_does_not_move_the_camera() {
        let mut camera = Camera::new((0.0, 1.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(1.0, 0.01);
        assert!(!controller.handle_key(KeyCode::ShiftLeft, ElementState::Pressed));
        assert!(!controller.handle_key(KeyCode::ShiftRight, ElementState::Pressed));
        controller.update(&mut camera, Duration::from_secs(1));
        assert_eq!(camera.position, Point3::new(0.0, 1.0, 0.0));

        controller.handle_key(KeyCode::KeyC, ElementState::Pressed);
        controller.update(&mut camera, Duration::from_secs(1));
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }
}
