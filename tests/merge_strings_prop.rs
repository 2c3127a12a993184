use portal_csp::{derive_legacy_nonce, merge_strings};
use proptest::prelude::*;

proptest! {
    #[test]
    fn merged_length_is_the_sum(s1 in ".{0,64}", s2 in ".{0,64}") {
        let merged = merge_strings(&s1, &s2);
        prop_assert_eq!(
            merged.chars().count(),
            s1.chars().count() + s2.chars().count()
        );
    }

    #[test]
    fn both_inputs_survive_as_subsequences(s1 in "[a-z]{0,32}", s2 in "[A-Z]{0,32}") {
        // Disjoint alphabets, so filtering recovers each input exactly.
        let merged = merge_strings(&s1, &s2);
        let lowers: String = merged.chars().filter(|c| c.is_ascii_lowercase()).collect();
        let uppers: String = merged.chars().filter(|c| c.is_ascii_uppercase()).collect();
        prop_assert_eq!(lowers, s1);
        prop_assert_eq!(uppers, s2);
    }

    #[test]
    fn equal_length_inputs_alternate(s in "[a-z]{1,32}") {
        let upper = s.to_ascii_uppercase();
        let merged = merge_strings(&s, &upper);
        for (i, c) in merged.chars().enumerate() {
            if i % 2 == 0 {
                prop_assert!(c.is_ascii_lowercase());
            } else {
                prop_assert!(c.is_ascii_uppercase());
            }
        }
    }

    #[test]
    fn legacy_nonce_is_always_44_base64_chars(ts in "[0-9]{1,16}", lic in "[a-zA-Z0-9-]{1,64}") {
        let nonce = derive_legacy_nonce(&ts, &lic);
        prop_assert_eq!(nonce.len(), 44);
    }
}

#[test]
fn documented_merge_vector() {
    assert_eq!(merge_strings("2024", "LICENSE"), "2L0I2C4ENSE");
}
