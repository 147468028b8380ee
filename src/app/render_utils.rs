use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::circles::{ConnectionType, NodeType};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.35 + (factor * 0.65))) as u8,
    )
}

pub(super) fn node_color(node_type: NodeType) -> Color32 {
    match node_type {
        NodeType::Author => Color32::from_rgb(88, 150, 214),
        NodeType::Publisher => Color32::from_rgb(214, 156, 72),
        NodeType::Binder => Color32::from_rgb(120, 178, 110),
    }
}

pub(super) fn connection_color(connection: ConnectionType) -> Color32 {
    match connection {
        ConnectionType::Publisher => Color32::from_rgb(150, 140, 120),
        ConnectionType::SharedPublisher => Color32::from_rgb(128, 128, 140),
        ConnectionType::Binder => Color32::from_rgb(116, 150, 112),
        ConnectionType::Family => Color32::from_rgb(196, 112, 196),
        ConnectionType::Friendship => Color32::from_rgb(96, 184, 200),
        ConnectionType::Influence => Color32::from_rgb(226, 196, 96),
        ConnectionType::Collaboration => Color32::from_rgb(112, 200, 150),
        ConnectionType::Scandal => Color32::from_rgb(222, 88, 88),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 22, 30));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(70, 64, 84, 60));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Bounding-box test; good enough to cull edges entirely off screen.
pub(super) fn segment_maybe_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(2.0);
    bounds.intersects(rect)
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

fn normalize_log(value: u32, min: u32, max: u32) -> f32 {
    let min = f64::from(min.max(1));
    let max = f64::from(max.max(1)).max(min);
    let value = f64::from(value.max(1));

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

/// Radius grows with the log of the entity's book count.
pub(super) fn node_radius(book_count: u32, min: u32, max: u32) -> f32 {
    9.0 + (normalize_log(book_count, min, max) * 17.0)
}

pub(super) fn edge_width(strength: Option<u8>, zoom: f32) -> f32 {
    let strength = f32::from(strength.unwrap_or(4).clamp(1, 10));
    ((0.6 + strength * 0.22) * zoom.sqrt()).clamp(0.5, 4.5)
}
