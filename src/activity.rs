use crate::Literal;
use ordered_float::OrderedFloat;

pub type Score = f64;

const DECAY: f64 = 0.93;
const RESCALE_THRESH: f64 = 1e100;

/// Decaying per-literal scores in an indexed max-heap. Every clause
/// admission bumps the score of each of its literals; decay is applied
/// lazily by inflating the bump increment and rescaling near overflow.
///
/// The heap holds candidate literals for branching. Literals of assigned
/// terms are dropped lazily as they surface and pushed back when the term
/// is unset, so the max element over free terms is always reachable.
#[derive(Clone, Debug)]
pub struct Activity {
    scores: Vec<Score>,        // literal code -> score
    heap: Vec<usize>,          // binary max-heap of literal codes
    slots: Vec<Option<usize>>, // literal code -> its slot in `heap`
    bump: Score,
}

impl Activity {
    pub fn new() -> Self {
        Self {
            scores: Vec::new(),
            heap: Vec::new(),
            slots: Vec::new(),
            bump: 1.0,
        }
    }

    /// Makes room for `num_terms` terms (two literal codes each). New
    /// codes start at score zero and join the heap.
    pub fn grow(&mut self, num_terms: usize) {
        let target = num_terms * 2;
        while self.scores.len() < target {
            let code = self.scores.len();
            self.scores.push(0.0);
            self.slots.push(None);
            self.enqueue(code);
        }
        debug_assert!(self.coherent());
    }

    pub fn decay(&mut self) {
        self.bump /= DECAY;
    }

    pub fn bump(&mut self, literal: Literal) {
        self.increase(literal.code(), self.bump);
    }

    /// Pops the highest-scoring candidate literal, or None if the heap is
    /// exhausted.
    pub fn pop(&mut self) -> Option<Literal> {
        let top = *self.heap.first()?;
        self.slots[top] = None;
        let last = self.heap.pop().expect("heap is non-empty");
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.slots[last] = Some(0);
            self.reheap(0);
        }
        debug_assert!(self.coherent());
        Some(Literal::from_code(top))
    }

    /// Returns a literal to the candidate heap; a no-op if it is already
    /// there.
    pub fn restore(&mut self, literal: Literal) {
        self.enqueue(literal.code());
    }

    fn increase(&mut self, code: usize, quantity: Score) {
        self.scores[code] += quantity;

        // Uniform rescale preserves the heap order.
        if self.scores[code] > RESCALE_THRESH {
            for score in self.scores.iter_mut() {
                *score /= RESCALE_THRESH;
            }
            self.bump /= RESCALE_THRESH;
        }

        if let Some(slot) = self.slots[code] {
            self.reheap(slot);
        }
        debug_assert!(self.coherent());
    }

    fn enqueue(&mut self, code: usize) {
        if self.slots[code].is_some() {
            return;
        }
        self.slots[code] = Some(self.heap.len());
        self.heap.push(code);
        self.reheap(self.heap.len() - 1);
    }

    fn key(&self, code: usize) -> OrderedFloat<Score> {
        OrderedFloat(self.scores[code])
    }

    /// Restores the heap property around `slot` after its entry's rank
    /// changed: the entry rises past any lower-ranked parents, then sinks
    /// below any higher-ranked child. Only one direction ever moves it.
    fn reheap(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.key(self.heap[parent]) >= self.key(self.heap[slot]) {
                break;
            }
            self.trade(slot, parent);
            slot = parent;
        }

        loop {
            let mut best = slot;
            for child in [slot * 2 + 1, slot * 2 + 2] {
                if child < self.heap.len() && self.key(self.heap[child]) > self.key(self.heap[best])
                {
                    best = child;
                }
            }
            if best == slot {
                break;
            }
            self.trade(slot, best);
            slot = best;
        }
    }

    fn trade(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a]] = Some(a);
        self.slots[self.heap[b]] = Some(b);
    }

    /// Slot table and heap agree exactly and no entry outranks its parent.
    fn coherent(&self) -> bool {
        let indexed = self
            .heap
            .iter()
            .enumerate()
            .all(|(slot, &code)| self.slots[code] == Some(slot))
            && self.slots.iter().flatten().count() == self.heap.len();
        let ordered = (1..self.heap.len())
            .all(|slot| self.key(self.heap[(slot - 1) / 2]) >= self.key(self.heap[slot]));
        indexed && ordered
    }
}
