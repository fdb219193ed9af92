use super::*;
use crate::algebra::{CscMatrix, VectorMath};

fn test_matrix_4x4() -> CscMatrix<f64> {
    // A =
    //[ 8.0  -3.0   2.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[  ⋅     ⋅    8.0  -1.0]
    //[  ⋅     ⋅     ⋅    1.0]
    let Ap = vec![0, 1, 3, 6, 8];
    let Ai = vec![0, 0, 1, 0, 1, 2, 2, 3];
    let Ax = vec![8., -3., 8., 2., -1., 8., -1., 1.];
    CscMatrix::new(4, 4, Ap, Ai, Ax)
}

// dense upper triangle of a positive definite matrix
fn test_matrix_dense_pd() -> CscMatrix<f64> {
    CscMatrix::from(&[
        [4., 1., 1., 1.], //
        [0., 5., 1., 1.], //
        [0., 0., 6., 1.], //
        [0., 0., 0., 7.], //
    ])
}

#[test]
fn test_invert_permutation() {
    assert_eq!(invert_permutation(&[3, 0, 2, 1]).unwrap(), vec![1, 3, 2, 0]);

    for bad in [&[3, 0, 2, 0][..], &[0, 0][..], &[4, 0, 2, 1][..]] {
        assert_eq!(invert_permutation(bad), Err(LdlError::InvalidPermutation));
    }
}

#[test]
fn test_gather_scatter() {
    let perm = [3, 0, 2, 1];
    let b = [1., 2., 3., 4.];
    let mut x = [0.; 4];
    let mut y = [0.; 4];

    gather(&mut x, &b, &perm);
    assert_eq!(x, [4., 1., 3., 2.]);
    scatter(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_solve_from_factors() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]

    let L = CscMatrix::new(4, 4, vec![0, 2, 4, 5, 5], vec![1, 2, 2, 3, 3], vec![1., 2., 1., 7., -3.]);
    let dinv = [0.25, -1.0, -0.5, 1.0];
    let x = vec![-3., 2., 1., 4.];

    let mut b = vec![-3., -1., -3., 15.];
    lsolve(&L, &mut b);
    assert_eq!(b, x);

    let mut b = vec![1., 31., -11., 4.];
    ltsolve(&L, &mut b);
    assert_eq!(b, x);

    let mut b = vec![4., -27., -1., -279.];
    ldl_solve(&L, &dinv, &mut b);
    assert_eq!(b, x);
}

#[test]
fn test_symbolic() {
    let sym = symbolic(&test_matrix_4x4());
    assert_eq!(sym.etree, vec![1, 2, 3, NONE]);
    assert_eq!(sym.colcount, vec![2, 1, 1, 0]);
}

#[test]
fn test_permute_symmetric() {
    // identity permutation leaves the matrix unchanged
    let A = test_matrix_4x4();
    let (P, map) = permute_triu(&A, &[0, 1, 2, 3]);
    assert_eq!(P, A);
    assert_eq!(map, (0..A.nnz()).collect::<Vec<_>>());

    // rows within the permuted columns are not sorted
    let mut A = test_matrix_4x4();
    for i in 0..A.nzval.len() {
        A.nzval[i] = i as f64 + 1.;
    }

    let iperm = invert_permutation(&[2, 3, 0, 1]).unwrap();
    let (P, _) = permute_triu(&A, &iperm);

    assert_eq!(&P.colptr, &vec![0, 1, 3, 5, 8]);
    assert_eq!(&P.rowval, &vec![0, 0, 1, 2, 0, 2, 3, 0]);
    assert_eq!(&P.nzval, &vec![6.0, 7.0, 8.0, 1.0, 4.0, 2.0, 3.0, 5.0]);
}

#[test]
fn test_settings_builder() {
    let opts = LdlSettings::default();
    assert_eq!(opts.amd_dense_scale, 1.0);
    assert!(opts.perm.is_none());

    let opts = LdlSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .amd_dense_scale(1.5)
        .build()
        .unwrap();
    assert_eq!(opts.amd_dense_scale, 1.5);
    assert_eq!(opts.perm, Some(vec![0, 1, 2, 3]));
}

#[test]
fn test_solve_basic() {
    let A = test_matrix_4x4();
    let x = [1., -2., 3., -4.];
    let b0 = [20.0, -22.0, 32.0, -7.0];

    let perms = [None, Some(vec![0, 1, 2, 3]), Some(vec![3, 0, 2, 1])];

    for perm in perms {
        let opts = perm.map(|p| LdlSettingsBuilder::default().perm(p).build().unwrap());
        let mut factors = LdlFactorisation::new(&A, opts).unwrap();
        let mut b = b0;
        factors.solve(&mut b);
        assert!(x.norm_inf_diff(&b) <= 1e-8);
    }
}

#[test]
fn test_update_values_refactor() {
    let A = test_matrix_4x4();
    let mut factors = LdlFactorisation::new(&A, None).unwrap();

    // double the whole matrix.  Solution halves
    let idx: Vec<usize> = (0..A.nnz()).collect();
    let vals: Vec<f64> = A.nzval.iter().map(|v| 2. * v).collect();
    factors.update_values(&idx, &vals);
    factors.refactor().unwrap();

    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
    assert!(b.norm_inf_diff(&[0.5, -1., 1.5, -2.]) <= 1e-8);
}

#[test]
fn test_inertia() {
    // quasidefinite [2 1; 1 -3]
    let A = CscMatrix::from(&[
        [2., 1.],  //
        [0., -3.], //
    ]);
    let factors = LdlFactorisation::new(&A, None).unwrap();
    assert_eq!(factors.positive_inertia(), 1);
    assert_eq!(factors.dim(), 2);
}

#[test]
fn test_rank_one_update_and_downdate() {
    let A = test_matrix_dense_pd();
    let b0 = [1., -2., 3., 0.5];

    // w = [1, 0, 2, 0], given with a split duplicate entry
    let widx = [0, 2, 2];
    let wval = [1., 1.5, 0.5];
    let sigma = 3.;

    // reference factorization of A + sigma*w*w'
    let mut Aup = A.clone();
    let w = [1., 0., 2., 0.];
    for col in 0..4 {
        for k in Aup.colptr[col]..Aup.colptr[col + 1] {
            let row = Aup.rowval[k];
            Aup.nzval[k] += sigma * w[row] * w[col];
        }
    }
    let mut reference = LdlFactorisation::new(&Aup, None).unwrap();
    let mut xref = b0;
    reference.solve(&mut xref);

    for perm in [None, Some(vec![3, 1, 0, 2])] {
        let opts = perm.map(|p| LdlSettingsBuilder::default().perm(p).build().unwrap());
        let mut factors = LdlFactorisation::new(&A, opts).unwrap();
        let mut xorig = b0;
        factors.solve(&mut xorig);

        factors.rank_one_update(&widx, &wval, sigma).unwrap();
        let mut x = b0;
        factors.solve(&mut x);
        assert!(x.norm_inf_diff(&xref) <= 1e-10);
        assert_eq!(factors.positive_inertia(), 4);

        // downdate back to the original matrix
        factors.rank_one_update(&widx, &wval, -sigma).unwrap();
        let mut x = b0;
        factors.solve(&mut x);
        assert!(x.norm_inf_diff(&xorig) <= 1e-10);
    }
}

#[test]
fn test_rank_one_downdate_indefinite() {
    let A = CscMatrix::from(&[
        [1., 0.5], //
        [0., 2.],  //
    ]);
    let opts = LdlSettingsBuilder::default().perm(vec![0, 1]).build().unwrap();
    let mut factors = LdlFactorisation::new(&A, Some(opts)).unwrap();

    let err = factors.rank_one_update(&[0], &[1.], -1.).unwrap_err();
    assert_eq!(err, LdlError::NotPositiveDefinite);

    // refactoring restores the stored matrix
    factors.refactor().unwrap();
    let mut b = [1.5, 2.5];
    factors.solve(&mut b);
    assert!(b.norm_inf_diff(&[1., 1.]) <= 1e-12);
}

#[test]
fn test_wrong_length_permutation() {
    let opts = LdlSettingsBuilder::default().perm(vec![0, 1]).build().unwrap();
    assert_eq!(
        LdlFactorisation::new(&test_matrix_4x4(), Some(opts)).unwrap_err(),
        LdlError::InvalidPermutation
    );
}

#[test]
fn test_bad_numeric_pivot() {
    let mut A = test_matrix_4x4();
    A.nzval[0] = 0.;
    let opts = LdlSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .build()
        .unwrap();
    let err = LdlFactorisation::new(&A, Some(opts)).unwrap_err();
    assert_eq!(err, LdlError::ZeroPivot);
}

#[test]
fn test_lower_triangular() {
    let A = CscMatrix::from(&[
        [1.0, 3.0, 5.0], //
        [2.0, 3.0, 6.0], //
        [1.0, 4.0, 7.0], //
    ]);
    assert_eq!(
        LdlFactorisation::new(&A, None).unwrap_err(),
        LdlError::NotUpperTriangular
    );
}

#[test]
fn test_zero_column_error() {
    let A = CscMatrix::from(&[
        [1.0, 0.0, 5.0], //
        [0.0, 0.0, 6.0], //
        [0.0, 0.0, 7.0], //
    ]);
    assert_eq!(
        LdlFactorisation::new(&A, None).unwrap_err(),
        LdlError::EmptyColumn
    );
}
