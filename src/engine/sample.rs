//! Sample value synthesis.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{date_bound, JsonSchema};
use crate::formats::{numeric_range, NumericRange, DOUBLE, INT64};
use crate::schema::{numeric_bound, SchemaType};
use crate::value::{FileUpload, Value, ValueMap};

const DEFAULT_MAX_LENGTH: u64 = 50;
const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
const UNIQUE_ITEM_ATTEMPTS: usize = 16;

impl JsonSchema<'_> {
    /// Synthesizes a value satisfying the schema, using the thread-local RNG.
    pub fn sample(&self) -> Value {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Synthesizes a value satisfying the schema using `rng`.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        if let Some(choice) = self
            .schema
            .enum_values
            .as_deref()
            .and_then(|options| options.choose(rng))
        {
            return choice.clone();
        }

        match self.schema.effective_type() {
            SchemaType::Number => self.sample_number(rng),
            SchemaType::Integer => self.sample_integer(rng),
            SchemaType::Boolean => Value::Bool(rng.gen()),
            SchemaType::String => match self.schema.format() {
                Some("byte") => self.sample_integer(rng),
                Some("date") | Some("date-time") => self.sample_date(rng),
                _ => self.sample_string(rng),
            },
            SchemaType::Array => self.sample_array(rng),
            SchemaType::Object => self.sample_object(rng),
            SchemaType::File => self.sample_file(rng),
        }
    }

    fn range(&self, fallback: NumericRange) -> NumericRange {
        self.schema
            .format()
            .and_then(numeric_range)
            .unwrap_or(fallback)
    }

    fn sample_integer<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let range = self.range(INT64);
        let minimum = self.schema.minimum.as_ref().and_then(numeric_bound);
        let maximum = self.schema.maximum.as_ref().and_then(numeric_bound);

        let max = match maximum {
            Some(m) if self.schema.exclusive_maximum => m.ceil() - 1.0,
            Some(m) => m.floor(),
            None => range.max,
        }
        .min(range.max);
        let min = match minimum {
            Some(m) if self.schema.exclusive_minimum => m.floor() + 1.0,
            Some(m) => m.ceil(),
            None => 1f64.min(max),
        }
        .max(range.min);

        // Saturating casts keep the int64 bounds representable.
        let (min, max) = (min as i64, max as i64);
        if min >= max {
            return Value::Integer(min);
        }
        Value::Integer(rng.gen_range(min..=max))
    }

    fn sample_number<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let range = self.range(DOUBLE);
        let minimum = self.schema.minimum.as_ref().and_then(numeric_bound);
        let maximum = self.schema.maximum.as_ref().and_then(numeric_bound);

        let max = match maximum {
            Some(m) if self.schema.exclusive_maximum => m - step(m, range.epsilon),
            Some(m) => m,
            None => range.max,
        }
        .min(range.max);
        let min = match minimum {
            Some(m) if self.schema.exclusive_minimum => m + step(m, range.epsilon),
            Some(m) => m,
            None => 0f64.min(max),
        }
        .max(range.min);

        if min >= max {
            return Value::Number(min);
        }
        let t: f64 = rng.gen();
        Value::Number((min * (1.0 - t) + max * t).clamp(min, max))
    }

    fn sample_string<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let (min, max) = length_range(
            self.schema.min_length.as_ref().and_then(numeric_bound),
            self.schema.max_length.as_ref().and_then(numeric_bound),
            1,
            DEFAULT_MAX_LENGTH,
        );
        let len = rng.gen_range(min..=max);
        let text: String = (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect();
        Value::String(text)
    }

    fn sample_array<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let (min, max) = length_range(
            self.schema.min_items.map(|n| n as f64),
            self.schema.max_items.map(|n| n as f64),
            1,
            DEFAULT_MAX_LENGTH,
        );
        let len = rng.gen_range(min..=max) as usize;
        let Some(items_schema) = self.schema.items.as_deref() else {
            return Value::Array(vec![Value::Object(ValueMap::new()); len]);
        };

        let child = self.child(items_schema);
        let mut out: Vec<Value> = Vec::with_capacity(len);
        for _ in 0..len {
            let mut item = child.sample_with(rng);
            if self.schema.unique_items {
                let mut attempts = 0;
                while out.contains(&item) && attempts < UNIQUE_ITEM_ATTEMPTS {
                    item = child.sample_with(rng);
                    attempts += 1;
                }
                if out.contains(&item) {
                    continue;
                }
            }
            out.push(item);
        }
        Value::Array(out)
    }

    fn sample_object<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let mut map = ValueMap::new();
        for (name, prop_schema) in &self.schema.properties {
            map.insert(name.clone(), self.child(prop_schema).sample_with(rng));
        }
        Value::Object(map)
    }

    fn sample_date<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let date_only = self.schema.format() == Some("date");
        // A whole day for dates, so truncation cannot land on an exclusive bound.
        let step = if date_only {
            TimeDelta::days(1)
        } else {
            TimeDelta::milliseconds(1)
        };
        let minimum = self.schema.minimum.as_ref().and_then(date_bound);
        let maximum = self.schema.maximum.as_ref().and_then(date_bound);

        let max_bound = maximum.map(|m| {
            if self.schema.exclusive_maximum {
                m.checked_sub_signed(step).unwrap_or(m)
            } else {
                m
            }
        });
        let mut min = match minimum {
            Some(m) if self.schema.exclusive_minimum => m.checked_add_signed(step).unwrap_or(m),
            Some(m) => m,
            None => match max_bound {
                Some(max) => DateTime::<Utc>::UNIX_EPOCH.min(max),
                None => DateTime::<Utc>::UNIX_EPOCH,
            },
        };
        let mut max = max_bound.unwrap_or_else(|| Utc::now().max(min));

        if date_only {
            min = ceil_to_day(min);
            max = floor_to_day(max);
        }
        if max < min {
            max = min;
        }

        let millis = rng.gen_range(min.timestamp_millis()..=max.timestamp_millis());
        let date = DateTime::from_timestamp_millis(millis).unwrap_or(min);
        Value::Date(if date_only { floor_to_day(date) } else { date })
    }

    fn sample_file<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let (min, max) = length_range(
            self.schema.min_length.as_ref().and_then(numeric_bound),
            self.schema.max_length.as_ref().and_then(numeric_bound),
            1,
            DEFAULT_MAX_FILE_SIZE,
        );
        let size = rng.gen_range(min..=max);
        let stem: String = (0..12).map(|_| char::from(rng.sample(Alphanumeric))).collect();
        Value::File(FileUpload::new(size, format!("uploads/{stem}")).with_original_name(stem))
    }
}

/// Offset that moves `bound` strictly inside an exclusive range.
fn step(bound: f64, epsilon: f64) -> f64 {
    epsilon * bound.abs().max(1.0)
}

/// Inclusive `[min, max]` from optional bounds, `max` defaulting to
/// `max(default_max, min)`.
fn length_range(
    min: Option<f64>,
    max: Option<f64>,
    default_min: u64,
    default_max: u64,
) -> (u64, u64) {
    let min = min.map(|m| m.max(0.0).ceil() as u64).unwrap_or(default_min);
    let max = max
        .map(|m| m.max(0.0).floor() as u64)
        .unwrap_or_else(|| default_max.max(min));
    (min.min(max), max)
}

fn floor_to_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn ceil_to_day(date: DateTime<Utc>) -> DateTime<Utc> {
    let floor = floor_to_day(date);
    if floor == date {
        floor
    } else {
        floor.checked_add_signed(TimeDelta::days(1)).unwrap_or(floor)
    }
}
