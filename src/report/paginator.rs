/// Navigation buttons of a paginated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
}

impl PageNav {
    pub const ALL: [PageNav; 4] = [PageNav::First, PageNav::Prev, PageNav::Next, PageNav::Last];

    pub fn key(self) -> &'static str {
        match self {
            PageNav::First => "first",
            PageNav::Prev => "prev",
            PageNav::Next => "next",
            PageNav::Last => "last",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            PageNav::First => "⏮",
            PageNav::Prev => "◀",
            PageNav::Next => "▶",
            PageNav::Last => "⏭",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|nav| nav.key() == key)
    }
}

/// Splits report rows into pages of at most `per_page` rows and tracks the
/// page being shown. Out-of-range moves clamp to the first/last page.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    pages: Vec<Vec<T>>,
    current: usize,
}

impl<T> Paginator<T> {
    /// `per_page` below 1 is treated as 1. An empty input produces no pages.
    pub fn new(rows: Vec<T>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let mut pages = Vec::with_capacity(rows.len().div_ceil(per_page));
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            pages.push(rows.by_ref().take(per_page).collect());
        }
        Self { pages, current: 0 }
    }

    pub fn pages(&self) -> &[Vec<T>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn current_page(&self) -> Option<&[T]> {
        self.pages.get(self.current).map(Vec::as_slice)
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current < self.last_index()
    }

    /// Applies a move and returns the new page index.
    pub fn apply(&mut self, nav: PageNav) -> usize {
        self.current = match nav {
            PageNav::First => 0,
            PageNav::Prev => self.current.saturating_sub(1),
            PageNav::Next => (self.current + 1).min(self.last_index()),
            PageNav::Last => self.last_index(),
        };
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_invariants() {
        for n in 0..=23usize {
            for m in 1..=7usize {
                let rows: Vec<usize> = (0..n).collect();
                let paginator = Paginator::new(rows.clone(), m);

                assert_eq!(paginator.page_count(), n.div_ceil(m), "n={} m={}", n, m);
                assert_eq!(paginator.is_empty(), n == 0);

                let pages = paginator.pages();
                for (i, page) in pages.iter().enumerate() {
                    assert!(!page.is_empty());
                    assert!(page.len() <= m);
                    if i + 1 < pages.len() {
                        assert_eq!(page.len(), m);
                    }
                }

                let rejoined: Vec<usize> = pages.iter().flatten().copied().collect();
                assert_eq!(rejoined, rows);
            }
        }
    }

    #[test]
    fn test_zero_per_page_is_one() {
        let paginator = Paginator::new(vec!['a', 'b'], 0);
        assert_eq!(paginator.page_count(), 2);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut paginator = Paginator::new((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(paginator.last_index(), 3);
        assert_eq!(paginator.current_page(), Some(&[0, 1, 2][..]));
        assert!(!paginator.can_go_back());

        assert_eq!(paginator.apply(PageNav::Prev), 0);
        assert_eq!(paginator.apply(PageNav::Next), 1);
        assert_eq!(paginator.apply(PageNav::Last), 3);
        assert_eq!(paginator.current_page(), Some(&[9][..]));
        assert!(!paginator.can_go_forward());
        assert_eq!(paginator.apply(PageNav::Next), 3);
        assert_eq!(paginator.apply(PageNav::Prev), 2);
        assert_eq!(paginator.apply(PageNav::First), 0);
    }

    #[test]
    fn test_navigation_on_empty() {
        let mut paginator: Paginator<u8> = Paginator::new(Vec::new(), 5);
        assert_eq!(paginator.current_page(), None);
        assert_eq!(paginator.apply(PageNav::Next), 0);
        assert_eq!(paginator.apply(PageNav::Last), 0);
    }

    #[test]
    fn test_nav_keys() {
        for nav in PageNav::ALL {
            assert_eq!(PageNav::from_key(nav.key()), Some(nav));
        }
        assert_eq!(PageNav::from_key("middle"), None);
    }
}
