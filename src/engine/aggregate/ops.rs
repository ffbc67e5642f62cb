use crate::engine::errors::QueryPlanError;

/// Client-side accumulator selected by label. One instance merges the values
/// of one (time bucket, field) cell for a single plan execution.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatorImpl {
    Avg(Avg),
    Sum(Sum),
    Count(Count),
    Max(Max),
    Min(Min),
}

impl AggregatorImpl {
    pub fn from_label(label: &str) -> Result<Self, QueryPlanError> {
        match label {
            "avg" => Ok(Self::Avg(Avg::default())),
            "sum" => Ok(Self::Sum(Sum::default())),
            "count" => Ok(Self::Count(Count::default())),
            "max" => Ok(Self::Max(Max::default())),
            "min" => Ok(Self::Min(Min::default())),
            other => Err(QueryPlanError::UnknownAggregator(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregatorImpl::Avg(_) => "avg",
            AggregatorImpl::Sum(_) => "sum",
            AggregatorImpl::Count(_) => "count",
            AggregatorImpl::Max(_) => "max",
            AggregatorImpl::Min(_) => "min",
        }
    }

    pub fn put(&mut self, value: f64) {
        match self {
            AggregatorImpl::Avg(a) => a.put(value),
            AggregatorImpl::Sum(a) => a.put(value),
            AggregatorImpl::Count(a) => a.put(value),
            AggregatorImpl::Max(a) => a.put(value),
            AggregatorImpl::Min(a) => a.put(value),
        }
    }

    pub fn get(&self) -> f64 {
        match self {
            AggregatorImpl::Avg(a) => a.get(),
            AggregatorImpl::Sum(a) => a.get(),
            AggregatorImpl::Count(a) => a.get(),
            AggregatorImpl::Max(a) => a.get(),
            AggregatorImpl::Min(a) => a.get(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Avg {
    sum: f64,
    count: u64,
}

impl Avg {
    pub fn put(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn get(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sum {
    sum: f64,
}

impl Sum {
    pub fn put(&mut self, value: f64) {
        self.sum += value;
    }

    pub fn get(&self) -> f64 {
        self.sum
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Count {
    count: u64,
}

impl Count {
    pub fn put(&mut self, _value: f64) {
        self.count += 1;
    }

    pub fn get(&self) -> f64 {
        self.count as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Max {
    value: Option<f64>,
}

impl Max {
    pub fn put(&mut self, value: f64) {
        self.value = Some(match self.value {
            Some(current) if current >= value => current,
            _ => value,
        });
    }

    pub fn get(&self) -> f64 {
        self.value.unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Min {
    value: Option<f64>,
}

impl Min {
    pub fn put(&mut self, value: f64) {
        self.value = Some(match self.value {
            Some(current) if current <= value => current,
            _ => value,
        });
    }

    pub fn get(&self) -> f64 {
        self.value.unwrap_or(f64::NAN)
    }
}
