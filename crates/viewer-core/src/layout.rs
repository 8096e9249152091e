//! Marker placement on the rendered image surface
//!
//! An issue's position is a percentage of the image's intrinsic bounding
//! box; pixel coordinates are derived from it and the current zoom scale on
//! every call, never cached across zoom changes.

use shared_types::Issue;

/// Pixel position of an issue's marker on the rendered image surface.
pub fn marker_position(
    issue: &Issue,
    intrinsic_width: f64,
    intrinsic_height: f64,
    zoom: f64,
) -> (f64, f64) {
    let x = issue.location_percent_x / 100.0 * intrinsic_width * zoom;
    let y = issue.location_percent_y / 100.0 * intrinsic_height * zoom;
    (x, y)
}

/// Issue indices in paint order: later entries paint on top.
///
/// Within overlapping markers the worst severity must stay clickable, so
/// minor paints first and critical last. Ties keep original order.
pub fn paint_order(issues: &[Issue]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..issues.len()).collect();
    order.sort_by_key(|&i| issues[i].severity.priority());
    order
}

/// Map a pointer position back to the nearest marker within `hit_radius`
/// pixels, or `None` if no marker is close enough.
///
/// Among candidates at effectively the same distance the higher severity
/// wins, matching what paint order makes clickable.
pub fn pick_marker(
    issues: &[Issue],
    pointer_x: f64,
    pointer_y: f64,
    intrinsic_width: f64,
    intrinsic_height: f64,
    zoom: f64,
    hit_radius: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, issue) in issues.iter().enumerate() {
        let (x, y) = marker_position(issue, intrinsic_width, intrinsic_height, zoom);
        let distance = ((pointer_x - x).powi(2) + (pointer_y - y).powi(2)).sqrt();
        if distance > hit_radius {
            continue;
        }

        let closer = match best {
            None => true,
            Some((best_i, best_distance)) => {
                distance < best_distance - f64::EPSILON
                    || ((distance - best_distance).abs() <= f64::EPSILON
                        && issue.severity.priority() > issues[best_i].severity.priority())
            }
        };
        if closer {
            best = Some((i, distance));
        }
    }

    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Severity;

    fn issue_at(severity: Severity, x: f64, y: f64) -> Issue {
        Issue {
            severity,
            criterion: "1.4.3".to_string(),
            title: "t".to_string(),
            location: "l".to_string(),
            location_percent_x: x,
            location_percent_y: y,
            problem: "p".to_string(),
            recommendation: "r".to_string(),
        }
    }

    #[test]
    fn position_scales_with_intrinsic_size_and_zoom() {
        let issue = issue_at(Severity::Critical, 10.0, 90.0);

        let (x, y) = marker_position(&issue, 1000.0, 800.0, 1.0);
        assert_eq!((x, y), (100.0, 720.0));

        let (x, y) = marker_position(&issue, 1000.0, 800.0, 2.0);
        assert_eq!((x, y), (200.0, 1440.0));

        let (x, y) = marker_position(&issue, 1000.0, 800.0, 0.5);
        assert_eq!((x, y), (50.0, 360.0));
    }

    #[test]
    fn corners_map_to_surface_corners() {
        let top_left = issue_at(Severity::Minor, 0.0, 0.0);
        let bottom_right = issue_at(Severity::Minor, 100.0, 100.0);

        assert_eq!(marker_position(&top_left, 640.0, 480.0, 1.5), (0.0, 0.0));
        assert_eq!(
            marker_position(&bottom_right, 640.0, 480.0, 1.5),
            (960.0, 720.0)
        );
    }

    #[test]
    fn paint_order_puts_critical_last() {
        let issues = vec![
            issue_at(Severity::Critical, 50.0, 50.0),
            issue_at(Severity::Minor, 50.0, 50.0),
            issue_at(Severity::Major, 50.0, 50.0),
        ];
        assert_eq!(paint_order(&issues), vec![1, 2, 0]);
    }

    #[test]
    fn paint_order_is_stable_within_severity() {
        let issues = vec![
            issue_at(Severity::Major, 10.0, 10.0),
            issue_at(Severity::Major, 20.0, 20.0),
            issue_at(Severity::Major, 30.0, 30.0),
        ];
        assert_eq!(paint_order(&issues), vec![0, 1, 2]);
    }

    #[test]
    fn pick_finds_marker_under_pointer() {
        let issues = vec![
            issue_at(Severity::Minor, 10.0, 10.0),
            issue_at(Severity::Minor, 90.0, 90.0),
        ];
        // 10% of 1000x1000 at zoom 1 is (100, 100)
        let hit = pick_marker(&issues, 103.0, 98.0, 1000.0, 1000.0, 1.0, 14.0);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn pick_misses_outside_hit_radius() {
        let issues = vec![issue_at(Severity::Minor, 10.0, 10.0)];
        let hit = pick_marker(&issues, 200.0, 200.0, 1000.0, 1000.0, 1.0, 14.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn pick_respects_zoom() {
        let issues = vec![issue_at(Severity::Minor, 10.0, 10.0)];
        // At zoom 2 the marker sits at (200, 200)
        assert_eq!(
            pick_marker(&issues, 200.0, 200.0, 1000.0, 1000.0, 2.0, 14.0),
            Some(0)
        );
        assert_eq!(
            pick_marker(&issues, 100.0, 100.0, 1000.0, 1000.0, 2.0, 14.0),
            None
        );
    }

    #[test]
    fn overlapping_pick_surfaces_worst_severity() {
        let issues = vec![
            issue_at(Severity::Minor, 50.0, 50.0),
            issue_at(Severity::Critical, 50.0, 50.0),
            issue_at(Severity::Major, 50.0, 50.0),
        ];
        let hit = pick_marker(&issues, 500.0, 500.0, 1000.0, 1000.0, 1.0, 14.0);
        assert_eq!(hit, Some(1));
    }
}
