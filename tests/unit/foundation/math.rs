use super::*;

#[test]
fn fnv_matches_reference_vectors() {
    let h = Fnv1a64::new_default();
    assert_eq!(h.finish(), Fnv1a64::OFFSET_BASIS);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn fnv_seed_changes_digest() {
    let mut a = Fnv1a64::new_default();
    a.write_u64(1);
    a.write_bytes(b"sofa");
    let mut b = Fnv1a64::new_default();
    b.write_u64(2);
    b.write_bytes(b"sofa");
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u16(100, 128), 50);
}
