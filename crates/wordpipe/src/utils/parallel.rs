//! # Batch Parallelism
//!
//! With the ``rayon`` feature these run across the rayon pool;
//! without it, they run sequentially. Output order is input order.

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;

        /// Map `f` over `items`, collecting results in input order.
        pub fn batch_map<I, O, F>(
            items: &[I],
            f: F,
        ) -> Vec<O>
        where
            I: Sync,
            O: Send,
            F: Fn(&I) -> O + Sync + Send,
        {
            items.par_iter().map(f).collect()
        }

        /// Apply `f` to every item in place.
        pub fn batch_for_each_mut<I, F>(
            items: &mut [I],
            f: F,
        ) where
            I: Send,
            F: Fn(&mut I) + Sync + Send,
        {
            items.par_iter_mut().for_each(f)
        }
    } else {
        /// Map `f` over `items`, collecting results in input order.
        pub fn batch_map<I, O, F>(
            items: &[I],
            f: F,
        ) -> Vec<O>
        where
            I: Sync,
            O: Send,
            F: Fn(&I) -> O + Sync + Send,
        {
            items.iter().map(f).collect()
        }

        /// Apply `f` to every item in place.
        pub fn batch_for_each_mut<I, F>(
            items: &mut [I],
            f: F,
        ) where
            I: Send,
            F: Fn(&mut I) + Sync + Send,
        {
            items.iter_mut().for_each(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_map_keeps_order() {
        let items: Vec<u32> = (0..100).collect();
        let doubled = batch_map(&items, |x| x * 2);
        assert_eq!(doubled, (0..100).map(|x| x * 2).collect::<Vec<_>>());

        let mut items = items;
        batch_for_each_mut(&mut items, |x| *x += 1);
        assert_eq!(items[99], 100);
    }
}
