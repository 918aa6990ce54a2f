/// Position of a carousel track. Each step moves the track by
/// `100 / items_per_view` percent; the index stays within
/// `[0, item_count - items_per_view]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    index: usize,
    item_count: usize,
    items_per_view: usize,
}

impl CarouselState {
    pub fn new(item_count: usize, items_per_view: usize) -> Self {
        Self {
            index: 0,
            item_count,
            items_per_view: items_per_view.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_index(&self) -> usize {
        self.item_count.saturating_sub(self.items_per_view)
    }

    pub fn can_prev(&self) -> bool {
        self.index > 0
    }

    pub fn can_next(&self) -> bool {
        self.index < self.max_index()
    }

    /// Returns whether the position changed.
    pub fn next(&mut self) -> bool {
        self.go_to(self.index + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.go_to(self.index.saturating_sub(1))
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        let clamped = index.min(self.max_index());
        let moved = clamped != self.index;
        self.index = clamped;
        moved
    }

    pub fn offset_percent(&self) -> f64 {
        self.index as f64 * 100.0 / self.items_per_view as f64
    }

    pub fn transform(&self) -> String {
        format!("translateX(-{}%)", trim_float(self.offset_percent()))
    }
}

fn trim_float(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut carousel = CarouselState::new(6, 3);
        assert!(!carousel.can_prev());
        assert!(carousel.can_next());
        assert!(!carousel.prev());

        assert!(carousel.next());
        assert!(carousel.next());
        assert!(carousel.next());
        assert_eq!(carousel.index(), 3);
        assert!(!carousel.can_next());
        assert!(!carousel.next());
        assert_eq!(carousel.index(), 3);
    }

    #[test]
    fn test_fewer_items_than_view() {
        let mut carousel = CarouselState::new(2, 3);
        assert_eq!(carousel.max_index(), 0);
        assert!(!carousel.can_next());
        assert!(!carousel.next());
    }

    #[test]
    fn test_offsets() {
        let mut carousel = CarouselState::new(6, 3);
        assert_eq!(carousel.transform(), "translateX(-0%)");
        carousel.next();
        assert_eq!(carousel.transform(), "translateX(-33.3333%)");
        carousel.go_to(99);
        assert_eq!(carousel.index(), 3);
        assert_eq!(carousel.offset_percent(), 100.0);

        let mut halves = CarouselState::new(4, 2);
        halves.next();
        assert_eq!(halves.transform(), "translateX(-50%)");
    }
}
