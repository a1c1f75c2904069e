/// Transform every item, no error channel.
///
/// For plain element-wise conversions that don't need a [`Config`](crate::Config),
/// e.g. inside a [`map_field`](crate::map_field) transform.
pub fn map_slice<A, B, F>(items: impl IntoIterator<Item = A>, f: F) -> Vec<B>
where
    F: FnMut(A) -> B,
{
    items.into_iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_in_order() {
        assert_eq!(map_slice(vec![3, 1, 2], |n| n * 10), vec![30, 10, 20]);
        assert_eq!(map_slice(&["a", "bc"], |s| s.len()), vec![1, 2]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(map_slice(Vec::<i32>::new(), |n| n.to_string()).is_empty());
    }
}
