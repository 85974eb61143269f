/// Dense row-major matrix backing a tableau.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Vec<Vec<f64>>,
}

impl Matrix {
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    pub(crate) fn new(data: Vec<Vec<f64>>) -> Self {
        if let Some(first) = data.first() {
            assert!(
                data.iter().all(|row| row.len() == first.len()),
                "ragged matrix rows"
            );
        }
        Self { data }
    }

    pub fn m(&self) -> usize {
        self.data.len()
    }

    pub fn n(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i][j]
    }

    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i][j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub(crate) fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(Vec::as_slice)
    }

    pub(crate) fn scale_row(&mut self, i: usize, scalar: f64) {
        assert!(scalar.is_finite(), "cannot scale row {i} by {scalar}");
        for x in &mut self.data[i] {
            *x *= scalar;
        }
    }

    /// `data[target] -= scalar * data[row]`
    pub(crate) fn row_operation(&mut self, target: usize, row: usize, scalar: f64) {
        assert!(!scalar.is_infinite() && !scalar.is_nan());
        if scalar == 0.0 || target == row {
            return;
        }
        let source = self.data[row].clone();
        for (x, y) in self.data[target].iter_mut().zip(&source) {
            *x -= scalar * y;
        }
    }

    /// Drops the given columns, keeping the remaining ones in order.
    pub(crate) fn remove_columns(&mut self, columns: &[usize]) {
        let mut mask = vec![true; self.n()];
        for &j in columns {
            mask[j] = false;
        }
        for row in &mut self.data {
            let mut keep = mask.iter();
            row.retain(|_| keep.next().copied().unwrap_or(true));
            row.shrink_to_fit()
        }
    }
}

pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}
