//! Fill tests
//!
//! Polygons and curves of every class, filled

use crate::runner::TestSuite;
use quill_paint::Color;

/// Create the fills test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("fills");

    suite.add("rectangle", |ctx| {
        let c = ctx.ctx();
        c.set_color(Color::BLUE);
        c.rectangle_fill(100.0, 100.0, 200.0, 100.0);
    });

    suite.add("triangle_path", |ctx| {
        let c = ctx.ctx();
        c.move_to(200.0, 50.0);
        c.line_to(300.0, 200.0);
        c.line_to(100.0, 200.0);
        c.close_path();
        c.fill();
    });

    // Concave star, relies on the fan's winding cancelling out
    suite.add("star_path", |ctx| {
        let c = ctx.ctx();
        let (cx, cy) = (200.0_f32, 150.0_f32);
        for i in 0..10 {
            let angle = std::f32::consts::PI * i as f32 / 5.0 - std::f32::consts::FRAC_PI_2;
            let r = if i % 2 == 0 { 100.0 } else { 40.0 };
            let (x, y) = (cx + r * angle.cos(), cy + r * angle.sin());
            if i == 0 {
                c.move_to(x, y);
            } else {
                c.line_to(x, y);
            }
        }
        c.close_path();
        c.set_color(Color::rgb(1.0, 0.8, 0.0));
        c.fill();
    });

    suite.add("quadratic_hump", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 250.0);
        c.quadratic_to(200.0, 0.0, 350.0, 250.0);
        c.close_path();
        c.fill();
    });

    suite.add("serpentine_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 200.0);
        c.cubic_to(200.0, 0.0, 250.0, 400.0, 350.0, 200.0);
        c.close_path();
        c.fill();
    });

    suite.add("loop_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(300.0, 300.0);
        c.cubic_to(0.0, 100.0, 300.0, 500.0, 500.0, 300.0);
        c.fill();
    });

    // Symmetric S-curve, its second inflection sits at infinity
    suite.add("single_inflection_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 200.0);
        c.cubic_to(150.0, 0.0, 250.0, 400.0, 350.0, 200.0);
        c.close_path();
        c.fill();
    });

    suite.add("crossed_controls_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(100.0, 300.0);
        c.cubic_to(300.0, 100.0, 100.0, 100.0, 300.0, 300.0);
        c.fill();
    });

    suite.add("arch_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(100.0, 300.0);
        c.cubic_to(100.0, 100.0, 300.0, 100.0, 300.0, 300.0);
        c.close_path();
        c.fill();
    });

    suite.add("two_subpaths", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 50.0);
        c.line_to(150.0, 50.0);
        c.line_to(100.0, 150.0);
        c.close_path();
        c.move_to(250.0, 50.0);
        c.line_to(350.0, 50.0);
        c.line_to(300.0, 150.0);
        c.close_path();
        c.fill();
    });

    suite.add("ellipse", |ctx| {
        let c = ctx.ctx();
        c.set_color(Color::GREEN);
        c.ellipse_fill(400.0, 300.0, 150.0, 80.0);
    });

    suite.add("rounded_rectangle", |ctx| {
        let c = ctx.ctx();
        c.rounded_rectangle_fill(100.0, 100.0, 200.0, 120.0, 20.0);
    });

    suite
}
