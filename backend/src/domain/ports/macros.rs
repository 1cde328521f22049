//! `define_port_error!` generates a port error enum together with
//! snake_case constructors whose `String` parameters accept anything `Into`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    define_port_error! {
        pub enum DraftStoreError {
            Unreachable { message: String } => "draft store unreachable: {message}",
            TooMany { limit: u32 } => "too many drafts (limit {limit})",
            Rejected { slug: String, attempts: u32 } => "slug {slug} rejected after {attempts} attempts",
            Closed => "draft store closed",
        }
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = DraftStoreError::unreachable("timeout");
        assert_eq!(err.to_string(), "draft store unreachable: timeout");
    }

    #[rstest]
    fn non_string_fields_keep_their_type() {
        let err = DraftStoreError::too_many(3_u32);
        assert_eq!(err, DraftStoreError::TooMany { limit: 3 });
    }

    #[rstest]
    fn mixed_fields_render_in_order() {
        let err = DraftStoreError::rejected("hello-world", 2_u32);
        assert_eq!(err.to_string(), "slug hello-world rejected after 2 attempts");
    }

    #[rstest]
    fn unit_variants_get_constructors() {
        assert_eq!(DraftStoreError::closed().to_string(), "draft store closed");
    }
}
