// External imports
use burn::tensor::backend::Backend;
use burn::tensor::cast::ToElement;
use burn::tensor::Tensor;
use ndarray::Array1;

/// Backend-agnostic view of an ordered numeric series.
///
/// The risk metrics in [`crate::metrics::risk`] are written once against
/// this trait and run unchanged on plain arrays (reporting) and on autodiff
/// tensors (training objective). Reductions (`mean`, `var`, `std`, `max`,
/// `min`) return a single-element series of the same backend so that tensor
/// results stay inside the gradient graph; binary element-wise operations
/// broadcast a single-element right-hand side.
///
/// `read_scalar` is the one escape hatch: it detaches a single-element
/// series into an `f64` for control-flow checks (zero denominators, skip
/// decisions) and must never feed back into gradient-carrying math.
pub trait NumericSeries: Clone {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First `len` entries, preserving order.
    fn truncated(&self, len: usize) -> Self;

    fn add_scalar(&self, value: f64) -> Self;

    fn sub_scalar(&self, value: f64) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    fn div(&self, other: &Self) -> Self;

    /// Arithmetic mean as a single-element series.
    fn mean(&self) -> Self;

    /// Population variance (ddof = 0).
    fn var(&self) -> Self;

    /// Population standard deviation (ddof = 0).
    fn std(&self) -> Self;

    /// Population covariance with `other`, as a single-element series.
    fn covariance(&self, other: &Self) -> Self {
        self.sub(&self.mean()).mul(&other.sub(&other.mean())).mean()
    }

    /// Element-wise `min(x, 0)`: the below-baseline part of an excess
    /// return series.
    fn downside(&self) -> Self;

    /// Running product over the series.
    fn cumulative_product(&self) -> Self;

    /// Running maximum over the series.
    fn running_max(&self) -> Self;

    fn max(&self) -> Self;

    fn min(&self) -> Self;

    /// The undefined-statistic sentinel: a single-element NaN series.
    fn undefined(&self) -> Self;

    /// Detached scalar read of a single-element series, outside any
    /// gradient path.
    fn read_scalar(&self) -> f64;
}

impl NumericSeries for Array1<f64> {
    fn len(&self) -> usize {
        Array1::len(self)
    }

    fn truncated(&self, len: usize) -> Self {
        self.slice(ndarray::s![..len]).to_owned()
    }

    fn add_scalar(&self, value: f64) -> Self {
        self.mapv(|v| v + value)
    }

    fn sub_scalar(&self, value: f64) -> Self {
        self.mapv(|v| v - value)
    }

    fn sub(&self, other: &Self) -> Self {
        if other.len() == 1 {
            let rhs = other[0];
            self.mapv(|v| v - rhs)
        } else {
            self - other
        }
    }

    fn mul(&self, other: &Self) -> Self {
        if other.len() == 1 {
            let rhs = other[0];
            self.mapv(|v| v * rhs)
        } else {
            self * other
        }
    }

    fn div(&self, other: &Self) -> Self {
        if other.len() == 1 {
            let rhs = other[0];
            self.mapv(|v| v / rhs)
        } else {
            self / other
        }
    }

    fn mean(&self) -> Self {
        if self.is_empty() {
            return self.undefined();
        }
        Array1::from_elem(1, self.sum() / Array1::len(self) as f64)
    }

    fn var(&self) -> Self {
        if self.is_empty() {
            return self.undefined();
        }
        let mean = self.sum() / Array1::len(self) as f64;
        let variance = self.mapv(|v| (v - mean) * (v - mean)).sum() / Array1::len(self) as f64;
        Array1::from_elem(1, variance)
    }

    fn std(&self) -> Self {
        NumericSeries::var(self).mapv(f64::sqrt)
    }

    fn downside(&self) -> Self {
        self.mapv(|v| v.min(0.0))
    }

    fn cumulative_product(&self) -> Self {
        let mut running = 1.0;
        self.mapv(|v| {
            running *= v;
            running
        })
    }

    fn running_max(&self) -> Self {
        let mut running = f64::NEG_INFINITY;
        self.mapv(|v| {
            running = propagating_max(running, v);
            running
        })
    }

    fn max(&self) -> Self {
        if self.is_empty() {
            return self.undefined();
        }
        let max = self.iter().fold(f64::NEG_INFINITY, |a, &b| propagating_max(a, b));
        Array1::from_elem(1, max)
    }

    fn min(&self) -> Self {
        if self.is_empty() {
            return self.undefined();
        }
        let min = self
            .iter()
            .fold(f64::INFINITY, |a, &b| -propagating_max(-a, -b));
        Array1::from_elem(1, min)
    }

    fn undefined(&self) -> Self {
        Array1::from_elem(1, f64::NAN)
    }

    fn read_scalar(&self) -> f64 {
        self.first().copied().unwrap_or(f64::NAN)
    }
}

// NaN-propagating maximum, matching the reduction semantics of the tensor
// backend (f64::max would silently skip NaN)
fn propagating_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

impl<B: Backend> NumericSeries for Tensor<B, 1> {
    fn len(&self) -> usize {
        self.dims()[0]
    }

    fn truncated(&self, len: usize) -> Self {
        self.clone().narrow(0, 0, len)
    }

    fn add_scalar(&self, value: f64) -> Self {
        self.clone().add_scalar(value)
    }

    fn sub_scalar(&self, value: f64) -> Self {
        self.clone().sub_scalar(value)
    }

    fn sub(&self, other: &Self) -> Self {
        self.clone().sub(other.clone())
    }

    fn mul(&self, other: &Self) -> Self {
        self.clone().mul(other.clone())
    }

    fn div(&self, other: &Self) -> Self {
        self.clone().div(other.clone())
    }

    fn mean(&self) -> Self {
        self.clone().mean()
    }

    fn var(&self) -> Self {
        let deviation = self.clone().sub(self.clone().mean());
        (deviation.clone() * deviation).mean()
    }

    fn std(&self) -> Self {
        NumericSeries::var(self).sqrt()
    }

    fn downside(&self) -> Self {
        self.clone().mask_fill(self.clone().greater_elem(0.0), 0.0)
    }

    fn cumulative_product(&self) -> Self {
        let n = self.dims()[0];
        let mut running = self.clone().narrow(0, 0, 1);
        let mut steps = Vec::with_capacity(n);
        steps.push(running.clone());
        for t in 1..n {
            running = running * self.clone().narrow(0, t, 1);
            steps.push(running.clone());
        }
        Tensor::cat(steps, 0)
    }

    fn running_max(&self) -> Self {
        let n = self.dims()[0];
        let mut running = self.clone().narrow(0, 0, 1);
        let mut steps = Vec::with_capacity(n);
        steps.push(running.clone());
        for t in 1..n {
            running = running.max_pair(self.clone().narrow(0, t, 1));
            steps.push(running.clone());
        }
        Tensor::cat(steps, 0)
    }

    fn max(&self) -> Self {
        self.clone().max()
    }

    fn min(&self) -> Self {
        self.clone().min()
    }

    fn undefined(&self) -> Self {
        Tensor::from_floats([f32::NAN], &self.device())
    }

    fn read_scalar(&self) -> f64 {
        self.clone().into_scalar().to_f64()
    }
}
