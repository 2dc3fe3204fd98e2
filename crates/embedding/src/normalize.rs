/// Scales `v` to unit L2 length in place. Zero vectors stay untouched so
/// the empty-document sentinel survives normalization.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm = v.iter().fold(0.0f32, |acc, x| acc + x * x).sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
