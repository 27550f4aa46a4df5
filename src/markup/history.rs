use crate::markup::model::Stroke;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeHistory {
    strokes: Vec<Stroke>,
}

impl StrokeHistory {
    pub fn commit(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Drops the most recent stroke. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.strokes.pop().is_some()
    }

    /// Empties the history and reports how many strokes were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.strokes.len();
        self.strokes.clear();
        removed
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::model::Point;

    fn sample_stroke(id: i32) -> Stroke {
        let start = Point::new(id as f32, id as f32);
        Stroke::from_points(vec![start, Point::new(start.x + 1.0, start.y + 1.0)])
    }

    #[test]
    fn undo_on_empty_history_reports_nothing_removed() {
        let mut history = StrokeHistory::default();
        assert!(!history.undo());
        assert!(history.is_empty());
    }

    #[test]
    fn undo_removes_most_recent_stroke_first() {
        let mut history = StrokeHistory::default();
        history.commit(sample_stroke(1));
        history.commit(sample_stroke(2));
        history.commit(sample_stroke(3));

        assert!(history.undo());
        assert_eq!(history.strokes(), &[sample_stroke(1), sample_stroke(2)]);
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut history = StrokeHistory::default();
        history.commit(sample_stroke(0));
        history.commit(sample_stroke(5));
        assert_eq!(history.clear(), 2);
        assert_eq!(history.clear(), 0);
    }
}
