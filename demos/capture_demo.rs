// 全屏 + 左上角 400x300 截图，不经过选区覆盖层
#[cfg(target_os = "windows")]
fn main() -> anyhow::Result<()> {
    use region_shot::capture::capture_region;
    use region_shot::config::Config;
    use region_shot::geometry::Rect;
    use region_shot::platform::win32::GdiPlatform;
    use region_shot::writer::write_png;
    use std::path::Path;

    env_logger::init();
    let platform = GdiPlatform::new(&Config::default());

    let full = capture_region(&platform, None)?;
    write_png(Path::new("fullscreen.png"), &full)?;
    println!("Saved fullscreen.png ({}x{})", full.width(), full.height());

    let area = capture_region(&platform, Some(Rect::new(0, 0, 400, 300)))?;
    write_png(Path::new("area.png"), &area)?;
    println!("Saved area.png ({}x{})", area.width(), area.height());
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn main() {
    eprintln!("capture_demo needs Windows");
}
