//! Property-based tests for reaction aggregation.
//!
//! Uses proptest to verify:
//! 1. Counts do not depend on the order reactions arrive in.
//! 2. Every reaction is counted exactly once.
//! 3. Any valid unicode scalar round-trips through its hex code point.
//! 4. Arbitrary code strings never panic the summary.

use proptest::prelude::*;
use topicchat::reactions::{aggregate, decode_emoji, summary_text};
use topicchat_proto::message::Reaction;

// --- Strategies ---

/// A small pool of emoji so that counts collide.
fn arb_reaction() -> impl Strategy<Value = Reaction> {
    prop_oneof![
        prop::sample::select(vec!["1f642", "1f44d", "1f389", "2764"]).prop_map(Reaction::unicode),
        prop::sample::select(vec!["tada", "yum", "octopus"]).prop_map(Reaction::custom),
    ]
}

fn arb_reactions() -> impl Strategy<Value = (Vec<Reaction>, Vec<Reaction>)> {
    prop::collection::vec(arb_reaction(), 0..30).prop_flat_map(|reactions| {
        let shuffled = Just(reactions.clone()).prop_shuffle();
        (Just(reactions), shuffled)
    })
}

// --- Property tests ---

proptest! {
    /// Shuffling reactions changes at most the order of entries, never the counts.
    #[test]
    fn counts_are_permutation_invariant((original, shuffled) in arb_reactions()) {
        let a = aggregate(&original);
        let b = aggregate(&shuffled);

        prop_assert_eq!(a.unicode.len(), b.unicode.len());
        prop_assert_eq!(a.custom.len(), b.custom.len());
        for (code, count) in &a.unicode {
            prop_assert_eq!(b.unicode.get(code), Some(count));
        }
        for (name, count) in &a.custom {
            prop_assert_eq!(b.custom.get(name), Some(count));
        }
    }

    /// The counts add up to the number of reactions.
    #[test]
    fn every_reaction_is_counted((original, _) in arb_reactions()) {
        let counts = aggregate(&original);
        prop_assert_eq!(counts.total(), original.len());
        prop_assert_eq!(counts.is_empty(), original.is_empty());
    }

    /// Any scalar value written as hex decodes back to itself.
    #[test]
    fn hex_code_point_round_trips(c in any::<char>()) {
        let code = format!("{:x}", u32::from(c));
        prop_assert_eq!(decode_emoji(&code), Ok(c.to_string()));
    }

    /// Malformed codes degrade to an empty summary instead of panicking.
    #[test]
    fn arbitrary_codes_never_panic(code in ".{0,16}") {
        let _ = summary_text(&[Reaction::unicode(code)]);
    }
}
