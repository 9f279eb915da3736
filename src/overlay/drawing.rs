use crate::geometry::{Point, Rect};

/// 选框折线：左上 -> 右上 -> 右下 -> 左下 -> 左上
pub fn outline_path(rect: Rect) -> [Point; 5] {
    [
        Point::new(rect.left, rect.top),
        Point::new(rect.right, rect.top),
        Point::new(rect.right, rect.bottom),
        Point::new(rect.left, rect.bottom),
        Point::new(rect.left, rect.top),
    ]
}

/// 以异或方式描边：每个边框像素与 `color` 异或一次，重复绘制同一矩形即可还原背景。
/// 画笔以边线为中心，宽度为 `pen_width`；超出画面的部分被裁剪。
pub fn xor_outline(
    frame: &mut [u32],
    width: u32,
    height: u32,
    rect: Rect,
    pen_width: i32,
    color: u32,
) {
    let pen = pen_width.max(1);
    let lo = pen / 2;
    let hi = pen - 1 - lo;
    let (sw, sh) = (width as i32, height as i32);

    let x0 = (rect.left - lo).max(0);
    let x1 = (rect.right + hi).min(sw - 1);
    let y0 = (rect.top - lo).max(0);
    let y1 = (rect.bottom + hi).min(sh - 1);
    for yy in y0..=y1 {
        let inner_row = yy > rect.top + hi && yy < rect.bottom - lo;
        let row = yy as u32 * width;
        for xx in x0..=x1 {
            if inner_row && xx > rect.left + hi && xx < rect.right - lo {
                continue;
            }
            frame[(row + xx as u32) as usize] ^= color;
        }
    }
}
