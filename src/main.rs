#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    render_lessons::run(render_lessons::LessonConfig::from_env())
}

// The web build starts from `run_web` in the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
