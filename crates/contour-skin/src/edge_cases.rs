//! Edge case tests for contour skinning robustness.
//!
//! Unusual inputs (degenerate contours, extreme spacings, odd link graphs)
//! must produce an error or a sensible mesh, never a panic or a hang.

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use crate::align::{AlignParams, EditKind, align, align_with_params};
    use crate::contour::{ContourId, TracedContour, link_pair};
    use crate::error::{ContourError, ErrorCode};
    use crate::mesh::{Face, Mesh};
    use crate::perimeter::Perimeter;
    use crate::reconstruct::{ReconstructParams, make_mesh, make_mesh_with_params};
    use crate::sampler::resample;

    fn ring(n: usize, radius: f64, z: f64) -> Perimeter {
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|k| {
                let t = TAU * k as f64 / n as f64;
                (radius * t.cos(), radius * t.sin())
            })
            .unzip();
        Perimeter::new(&xs, &ys, z, true).unwrap()
    }

    fn traced_ring(id: u64, n: usize, radius: f64, z: f64) -> TracedContour {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let t = TAU * k as f64 / n as f64;
                (radius * t.cos(), radius * t.sin())
            })
            .collect();
        TracedContour::from_xy(id, &points, z)
    }

    // ==================== Resampling ====================

    #[test]
    fn test_collinear_perimeter_resamples() {
        let mut p = Perimeter::new(&[0.0, 5.0, 10.0], &[0.0, 0.0, 0.0], 0.0, true).unwrap();
        resample(&mut p, 1.0).unwrap();
        assert!(p.len() > 1);
        assert_eq!(p.points().len(), p.directions().len());
    }

    #[test]
    fn test_all_points_coincident() {
        let mut p = Perimeter::new(&[1.0; 5], &[1.0; 5], 0.0, true).unwrap();
        resample(&mut p, 1.0).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.directions()[0].norm(), 0.0);
    }

    #[test]
    fn test_repeated_points_are_skipped() {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for k in 0..32 {
            let t = TAU * k as f64 / 32.0;
            // every point traced twice
            for _ in 0..2 {
                xs.push(5.0 * t.cos());
                ys.push(5.0 * t.sin());
            }
        }
        let mut p = Perimeter::new(&xs, &ys, 0.0, true).unwrap();
        resample(&mut p, 0.5).unwrap();
        for w in p.points().windows(2) {
            assert!((w[1] - w[0]).norm() > 0.1);
        }
    }

    #[test]
    fn test_delta_larger_than_contour() {
        let mut p = ring(16, 1.0, 0.0);
        resample(&mut p, 100.0).unwrap();
        assert!(!p.is_empty());
    }

    #[test]
    fn test_tiny_delta() {
        let mut p = ring(64, 1.0, 0.0);
        resample(&mut p, 1e-3).unwrap();
        assert!(p.len() > 5000, "got {} points", p.len());
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let mut p = Perimeter::new(&[0.0, f64::NAN, 1.0], &[0.0, 1.0, 1.0], 0.0, true).unwrap();
        let err = resample(&mut p, 1.0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DegenerateInput);

        let q = Perimeter::new(&[0.0, f64::INFINITY], &[0.0, 0.0], 1.0, true).unwrap();
        assert!(align(&ring(4, 1.0, 0.0), &q, 1.0).is_err());
    }

    // ==================== Alignment ====================

    #[test]
    fn test_two_single_points() {
        let a = Perimeter::new(&[0.0], &[0.0], 0.0, true).unwrap();
        let b = Perimeter::new(&[3.0], &[4.0], 1.0, true).unwrap();
        let seq = align(&a, &b, 1.0).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.operations()[0].kind, EditKind::Mutate);
        // the last cell never pays for a mutation
        assert_eq!(seq.total_cost(), 0.0);
    }

    #[test]
    fn test_very_different_sizes() {
        let small = ring(3, 0.1, 0.0);
        let large = ring(200, 20.0, 1.0);
        let seq = align(&small, &large, 0.6).unwrap();
        let counts = seq.counts();
        assert_eq!(counts.mutations + counts.deletions, 3);
        assert_eq!(counts.mutations + counts.insertions, 200);
    }

    #[test]
    fn test_zero_tolerance_still_backtracks_exact_cases() {
        let params = AlignParams::default().with_tolerance(1e-12);
        let seq = align_with_params(&ring(8, 1.0, 0.0), &ring(8, 1.0, 1.0), 0.5, &params).unwrap();
        assert_eq!(seq.counts().mutations, 8);
    }

    #[test]
    fn test_huge_coarse_fraction() {
        let params = AlignParams::default().with_coarse_fraction(5.0);
        let mut shifted = ring(20, 2.0, 1.0);
        shifted.reorder(7);
        let seq = align_with_params(&ring(20, 2.0, 0.0), &shifted, 0.6, &params).unwrap();
        assert_eq!(seq.p2_index(0), 13);
    }

    // ==================== Mesh ====================

    #[test]
    fn test_open_perimeters_have_no_closing_face() {
        let xs: Vec<f64> = (0..6).map(|k| k as f64).collect();
        let ys = vec![0.0; 6];
        let a = Perimeter::new(&xs, &ys, 0.0, false).unwrap();
        let b = Perimeter::new(&xs, &ys, 1.0, false).unwrap();
        let seq = align(&a, &b, 1.0).unwrap();
        let mut mesh = Mesh::new();
        let added = mesh.add_skin(ContourId(1), &a, ContourId(2), &b, &seq).unwrap();
        assert_eq!(added, 5);
        assert!(mesh.faces().iter().all(|f| matches!(f, Face::Quad(_))));
    }

    #[test]
    fn test_skin_same_pair_twice_reuses_points() {
        let a = ring(10, 1.0, 0.0);
        let b = ring(10, 1.0, 1.0);
        let seq = align(&a, &b, 0.6).unwrap();
        let mut mesh = Mesh::new();
        mesh.add_skin(ContourId(1), &a, ContourId(2), &b, &seq).unwrap();
        mesh.add_skin(ContourId(1), &a, ContourId(2), &b, &seq).unwrap();
        assert_eq!(mesh.vertex_count(), 20);
    }

    // ==================== Reconstruction ====================

    #[test]
    fn test_empty_group() {
        let none: Vec<TracedContour> = Vec::new();
        assert_eq!(make_mesh(&none).unwrap_err().code(), ErrorCode::DegenerateInput);
    }

    #[test]
    fn test_all_contours_empty() {
        let group = vec![
            TracedContour::new(1, Vec::new(), Vec::new(), 0.0),
            TracedContour::new(2, Vec::new(), Vec::new(), 1.0),
        ];
        assert_eq!(make_mesh(&group).unwrap_err().code(), ErrorCode::DegenerateInput);
    }

    #[test]
    fn test_mismatched_coordinates() {
        let group = vec![
            TracedContour::new(1, vec![0.0, 1.0], vec![0.0], 0.0),
            traced_ring(2, 8, 1.0, 1.0),
        ];
        assert!(matches!(
            make_mesh(&group),
            Err(ContourError::LengthMismatch { x_len: 2, y_len: 1 })
        ));
    }

    #[test]
    fn test_links_on_same_layer_only() {
        let mut a = traced_ring(1, 12, 1.0, 0.0);
        let mut b = traced_ring(2, 12, 2.0, 0.0);
        link_pair(&mut a, &mut b);
        let mesh = make_mesh(&[a, b]).unwrap();
        assert_eq!(mesh.perimeter_count(), 2);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_empty_link_set_is_not_unlinked() {
        let mut a = traced_ring(1, 12, 1.0, 0.0);
        a.links = Some(Vec::new());
        let mut b = traced_ring(2, 12, 1.0, 1.0);
        b.links = Some(Vec::new());
        let mesh = make_mesh(&[a, b]).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut a = traced_ring(1, 12, 1.0, 0.0);
        let mut b = traced_ring(2, 12, 1.0, 1.0);
        link_pair(&mut a, &mut b);
        let copy = a.clone();
        let mesh = make_mesh(&[a, b, copy]).unwrap();
        assert_eq!(mesh.perimeter_count(), 2);
    }

    #[test]
    fn test_self_link_is_ignored() {
        let mut a = traced_ring(1, 12, 1.0, 0.0).linked_to(ContourId(1));
        let mut b = traced_ring(2, 12, 1.0, 1.0);
        link_pair(&mut a, &mut b);
        let mesh = make_mesh(&[a, b]).unwrap();
        assert!(mesh.face_count() > 0);
    }

    #[test]
    fn test_translation_invariant_params() {
        let mut a = traced_ring(1, 24, 3.0, 0.0);
        let points: Vec<(f64, f64)> = a.x.iter().zip(&a.y).map(|(x, y)| (x + 10.0, *y)).collect();
        let mut b = TracedContour::from_xy(2, &points, 1.0);
        link_pair(&mut a, &mut b);
        let mesh =
            make_mesh_with_params(&[a, b], &ReconstructParams::translation_invariant()).unwrap();
        assert!(mesh.face_count() > 0);
    }

    // ==================== Thread safety ====================

    #[test]
    fn test_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Perimeter>();
        assert_send_sync::<Mesh>();
        assert_send_sync::<crate::align::EditSequence>();
        assert_send_sync::<ContourError>();
    }
}
