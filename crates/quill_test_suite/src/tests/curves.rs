//! Curve tests
//!
//! Arcs and degenerate control polygons

use crate::runner::TestSuite;
use std::f32::consts::{FRAC_PI_2, PI};

/// Create the curves test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("curves");

    suite.add("pie_slice", |ctx| {
        let c = ctx.ctx();
        c.move_to(200.0, 200.0);
        c.arc(200.0, 200.0, 100.0, 1.5 * PI, 0.0);
        c.close_path();
        c.fill();
    });

    suite.add("half_circle_stroke", |ctx| {
        let c = ctx.ctx();
        c.set_width(6.0);
        c.arc(400.0, 300.0, 150.0, PI, PI);
        c.stroke();
    });

    suite.add("clockwise_arc", |ctx| {
        let c = ctx.ctx();
        c.set_width(2.0);
        c.arc(400.0, 300.0, 50.0, -FRAC_PI_2, 0.0);
        c.stroke();
    });

    // Control points collapsing onto the chord
    suite.add("flat_cubic", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 100.0);
        c.cubic_to(150.0, 100.0, 250.0, 100.0, 350.0, 100.0);
        c.set_width(4.0);
        c.stroke();
    });

    suite.add("coincident_controls", |ctx| {
        let c = ctx.ctx();
        c.move_to(50.0, 100.0);
        c.cubic_to(50.0, 100.0, 350.0, 300.0, 350.0, 300.0);
        c.set_width(4.0);
        c.stroke();
    });

    suite.add("elevated_quadratic", |ctx| {
        let c = ctx.ctx();
        // Degree elevation of (0,0) (150,300) (300,0)
        c.move_to(100.0, 300.0);
        c.cubic_to(200.0, 100.0, 300.0, 100.0, 400.0, 300.0);
        c.fill();
    });

    suite
}
