//! Container codecs

use super::{read_object, string_size_hint, write_string, JsonCodec};
use crate::decode::{DecodeContext, DecodeResult};
use crate::encode::EncodeContext;
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

impl<T: JsonCodec> JsonCodec for Vec<T> {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        T::seq_size_hint(self, ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        T::write_seq(self, ctx);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        T::read_seq(ctx)
    }
}

/// `None` is written as `null`.
impl<T: JsonCodec> JsonCodec for Option<T> {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        match self {
            Some(v) => v.size_hint(ctx),
            None => 4,
        }
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        match self {
            Some(v) => v.write_json(ctx),
            None => ctx.push_str("null"),
        }
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        if ctx.match_literal("null") {
            Ok(None)
        } else {
            T::read_json(ctx).map(Some)
        }
    }
}

impl<T: JsonCodec> JsonCodec for Box<T> {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        (**self).size_hint(ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        (**self).write_json(ctx);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        T::read_json(ctx).map(Box::new)
    }
}

impl<T: JsonCodec> JsonCodec for Arc<T> {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        (**self).size_hint(ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        (**self).write_json(ctx);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        T::read_json(ctx).map(Arc::new)
    }
}

fn entries_size_hint<'e, V, I>(entries: I, ctx: &EncodeContext) -> usize
where
    V: JsonCodec + 'e,
    I: Iterator<Item = (&'e String, &'e V)>,
{
    2 + entries
        .map(|(k, v)| string_size_hint(k.as_bytes()) + 2 + v.size_hint(ctx))
        .sum::<usize>()
}

fn write_entries<'e, V, I>(entries: I, ctx: &mut EncodeContext)
where
    V: JsonCodec + 'e,
    I: Iterator<Item = (&'e String, &'e V)>,
{
    ctx.push(b'{');
    for (i, (k, v)) in entries.enumerate() {
        if i > 0 {
            ctx.push(b',');
        }
        write_string(ctx, k.as_bytes());
        ctx.push(b':');
        v.write_json(ctx);
    }
    ctx.push(b'}');
}

fn read_entries<V, F>(ctx: &mut DecodeContext<'_>, expected: &'static str, mut insert: F) -> DecodeResult<()>
where
    V: JsonCodec,
    F: FnMut(String, V),
{
    read_object(ctx, expected, |ctx, key| {
        let key = match std::str::from_utf8(key) {
            Ok(k) => k.to_owned(),
            Err(_) => return ctx.fail(expected, "invalid UTF-8 in key"),
        };
        let value = V::read_json(ctx)?;
        insert(key, value);
        Ok(())
    })
}

/// Keys are emitted in sorted order.
impl<V: JsonCodec> JsonCodec for BTreeMap<String, V> {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        entries_size_hint(self.iter(), ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        write_entries(self.iter(), ctx);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let mut map = BTreeMap::new();
        read_entries(ctx, type_name::<Self>(), |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

/// Keys are sorted before emission, so output does not depend on hash order.
impl<V, S> JsonCodec for HashMap<String, V, S>
where
    V: JsonCodec,
    S: BuildHasher + Default,
{
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        entries_size_hint(self.iter(), ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        write_entries(sorted_entries(self).into_iter(), ctx);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let mut map = HashMap::default();
        read_entries(ctx, type_name::<Self>(), |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

fn sorted_entries<K: Ord + Hash, V, S>(map: &HashMap<K, V, S>) -> Vec<(&K, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Written as a two-element array.
impl<A: JsonCodec, B: JsonCodec> JsonCodec for (A, B) {
    fn size_hint(&self, ctx: &EncodeContext) -> usize {
        3 + self.0.size_hint(ctx) + self.1.size_hint(ctx)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        ctx.push(b'[');
        self.0.write_json(ctx);
        ctx.push(b',');
        self.1.write_json(ctx);
        ctx.push(b']');
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let expected = type_name::<Self>();
        ctx.expect_byte(expected, b'[', "expected [")?;
        let a = A::read_json(ctx)?;
        ctx.expect_byte(expected, b',', "expected ,")?;
        let b = B::read_json(ctx)?;
        ctx.expect_byte(expected, b']', "expected ]")?;
        Ok((a, b))
    }
}
