/// Declares `i64` record ids as transparent newtypes.
///
/// The server uses `0` for "no user" on anonymous reports, so every id
/// gets an `is_unset` check next to the raw `value`.
///
/// ```ignore
/// wire_ids! {
///     /// Marketplace listing.
///     ListingId,
/// }
/// ```
macro_rules! wire_ids {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }

            pub fn is_unset(&self) -> bool {
                self.0 == 0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::convert::From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    )+};
}

pub(crate) use wire_ids;
