//! Struct codecs

/// Implement [`JsonCodec`](crate::JsonCodec) for a plain struct.
///
/// The struct is written as an object with one member per listed field, in
/// the listed order. The reader accepts members in any order, skips unknown
/// members and leaves missing fields at their `Default` value, so the struct
/// must implement `Default`.
///
/// ```
/// use blobjson_core::{json_struct, Value};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Sample {
///     name: String,
///     weights: Vec<f64>,
/// }
///
/// json_struct!(Sample { name, weights });
///
/// let s = Sample { name: "a".into(), weights: vec![0.5, 1.0] };
/// let v = Value::encode(&s);
/// assert_eq!(v.as_str(), Some(r#"{"name":"a","weights":[0.5,1]}"#));
/// assert_eq!(v.decode::<Sample>().unwrap(), s);
/// ```
#[macro_export]
macro_rules! json_struct {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::JsonCodec for $ty {
            #[allow(unused_variables)]
            fn size_hint(&self, ctx: &$crate::EncodeContext) -> usize {
                2 $(+ stringify!($field).len() + 4 + $crate::JsonCodec::size_hint(&self.$field, ctx))*
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn write_json(&self, ctx: &mut $crate::EncodeContext) {
                ctx.push(b'{');
                let mut first = true;
                $(
                    if !first {
                        ctx.push(b',');
                    }
                    first = false;
                    ctx.write_key(stringify!($field));
                    $crate::JsonCodec::write_json(&self.$field, ctx);
                )*
                ctx.push(b'}');
            }

            #[allow(unused_mut, unused_variables)]
            fn read_json(ctx: &mut $crate::DecodeContext<'_>) -> $crate::DecodeResult<Self> {
                let expected = ::std::any::type_name::<$ty>();
                let mut value = <$ty as ::std::default::Default>::default();
                $crate::codec::read_object(ctx, expected, |ctx, key| {
                    $(
                        if key == stringify!($field).as_bytes() {
                            value.$field = $crate::JsonCodec::read_json(ctx)?;
                            return Ok(());
                        }
                    )*
                    ctx.skip_value(expected)
                })?;
                Ok(value)
            }
        }
    };
}
