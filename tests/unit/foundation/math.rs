use super::*;

#[test]
fn mul_div255_edges() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn unpremul_restores_half_alpha() {
    let mut px = [64, 32, 0, 128, 9, 9, 9, 255, 5, 5, 5, 0];
    unpremul_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..], &[9, 9, 9, 255, 5, 5, 5, 0]);
}
