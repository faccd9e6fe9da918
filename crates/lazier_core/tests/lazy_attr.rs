use lazier_core::{Fetched, LazyAttr, LazyResult, LazySlot, Produced, SourceKind};
use once_cell::sync::Lazy;
use std::cell::Cell;

struct Plain {
    calls: Cell<u32>,
    x: LazySlot<String>,
}

static PLAIN_X: Lazy<LazyAttr<Plain, String>> = Lazy::new(|| {
    LazyAttr::new("x", |plain: &Plain| {
        plain.calls.set(plain.calls.get() + 1);
        Produced::Cache("x".to_string())
    })
    .expect("valid descriptor")
});

impl Plain {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            x: LazySlot::new(),
        }
    }

    fn x(&self) -> LazyResult<Fetched<'_, String>> {
        PLAIN_X.get(self, &self.x)
    }
}

#[test]
fn first_read_computes_and_second_read_uses_cache() {
    let plain = Plain::new();

    assert_eq!(*plain.x().unwrap(), "x");
    assert_eq!(*plain.x().unwrap(), "x");
    assert!(plain.x().unwrap().is_cached());
    assert_eq!(plain.calls.get(), 1);
}

#[test]
fn each_instance_gets_its_own_slot() {
    let first = Plain::new();
    let second = Plain::new();

    first.x().unwrap();
    assert!(first.x.is_set());
    assert!(!second.x.is_set());

    second.x().unwrap();
    assert_eq!(first.calls.get(), 1);
    assert_eq!(second.calls.get(), 1);
}

#[test]
fn clearing_the_slot_forces_recomputation() {
    let mut plain = Plain::new();
    assert_eq!(plain.x().unwrap().into_owned(), "x");

    assert_eq!(plain.x.clear().as_deref(), Some("x"));
    assert_eq!(plain.x().unwrap().into_owned(), "x");
    assert_eq!(plain.calls.get(), 2);
}

#[test]
fn descriptor_metadata_is_readable_without_computing() {
    let plain = Plain::new();
    let info = PLAIN_X.info();

    assert_eq!(info.name, "x");
    assert_eq!(info.source, SourceKind::Function);
    assert_eq!(info.source_name, "x");
    assert_eq!(plain.calls.get(), 0);
    assert!(!plain.x.is_set());
}

struct Ticker {
    ticks: Cell<u64>,
    tick: LazySlot<u64>,
}

static TICKER_TICK: Lazy<LazyAttr<Ticker, u64>> = Lazy::new(|| {
    LazyAttr::new("tick", |ticker: &Ticker| {
        ticker.ticks.set(ticker.ticks.get() + 1);
        Produced::Volatile(ticker.ticks.get())
    })
    .expect("valid descriptor")
});

#[test]
fn volatile_source_recomputes_on_every_read() {
    let ticker = Ticker {
        ticks: Cell::new(0),
        tick: LazySlot::new(),
    };

    let reads = (0..3)
        .map(|_| *TICKER_TICK.get(&ticker, &ticker.tick).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(reads, vec![1, 2, 3]);
    assert!(!ticker.tick.is_set());
}

struct Other {
    calls: Cell<u32>,
    x: LazySlot<String>,
}

static OTHER_X: Lazy<LazyAttr<Other, String>> = Lazy::new(|| {
    LazyAttr::named("x")
        .function("get_x", |other: &Other| Produced::Cache(other.get_x()))
        .build()
        .expect("valid descriptor")
});

impl Other {
    fn get_x(&self) -> String {
        self.calls.set(self.calls.get() + 1);
        "x".to_string()
    }

    fn x(&self) -> LazyResult<Fetched<'_, String>> {
        OTHER_X.get(self, &self.x)
    }
}

#[test]
fn named_attribute_keeps_original_function_uncached() {
    let other = Other {
        calls: Cell::new(0),
        x: LazySlot::new(),
    };

    assert_eq!(*other.x().unwrap(), "x");
    assert_eq!(*other.x().unwrap(), "x");
    assert_eq!(other.calls.get(), 1);

    assert_eq!(other.get_x(), "x");
    assert_eq!(other.get_x(), "x");
    assert_eq!(other.calls.get(), 3);
    assert_eq!(OTHER_X.info().source_name, "get_x");
}

trait Base: 'static {
    fn x_slot(&self) -> &LazySlot<String>;

    fn get_x(&self) -> String {
        base_get_x()
    }

    fn x(&self) -> LazyResult<Fetched<'_, String>>
    where
        Self: Sized,
    {
        BASE_X.get(self, self.x_slot())
    }
}

fn base_get_x() -> String {
    "base_x".to_string()
}

static BASE_X: Lazy<LazyAttr<dyn Base, String>> = Lazy::new(|| {
    LazyAttr::<dyn Base, String>::named("x")
        .method("get_x", |base| Produced::Cache(base.get_x()))
        .build()
        .expect("valid descriptor")
});

struct BaseOnly {
    x: LazySlot<String>,
}

impl Base for BaseOnly {
    fn x_slot(&self) -> &LazySlot<String> {
        &self.x
    }
}

struct Subclass {
    builds: Cell<u32>,
    x: LazySlot<String>,
}

impl Base for Subclass {
    fn x_slot(&self) -> &LazySlot<String> {
        &self.x
    }

    fn get_x(&self) -> String {
        self.builds.set(self.builds.get() + 1);
        format!("x from {}", base_get_x())
    }
}

#[test]
fn method_indirection_uses_overriding_implementation() {
    let base = BaseOnly { x: LazySlot::new() };
    assert_eq!(*base.x().unwrap(), "base_x");

    let sub = Subclass {
        builds: Cell::new(0),
        x: LazySlot::new(),
    };
    assert_eq!(*sub.x().unwrap(), "x from base_x");
    assert_eq!(*sub.x().unwrap(), "x from base_x");
    assert_eq!(sub.builds.get(), 1);
    assert_eq!(BASE_X.info().source, SourceKind::Method);
}

trait Shape: 'static {
    fn area_slot(&self) -> &LazySlot<f64>;

    fn compute_area(&self) -> f64;
}

static SHAPE_AREA: Lazy<LazyAttr<dyn Shape, f64>> = Lazy::new(|| {
    LazyAttr::<dyn Shape, f64>::named("area")
        .method("compute_area", |shape| Produced::Cache(shape.compute_area()))
        .abstract_method()
        .doc("Area of the shape, computed once.")
        .build()
        .expect("valid descriptor")
});

struct Square {
    side: f64,
    area: LazySlot<f64>,
}

impl Shape for Square {
    fn area_slot(&self) -> &LazySlot<f64> {
        &self.area
    }

    fn compute_area(&self) -> f64 {
        self.side * self.side
    }
}

#[test]
fn abstract_method_attribute_reads_through_implementor() {
    let square = Square {
        side: 3.0,
        area: LazySlot::new(),
    };

    let area = SHAPE_AREA.get(&square, square.area_slot()).unwrap();
    assert_eq!(*area, 9.0);
    assert!(SHAPE_AREA.info().is_abstract);
    assert_eq!(
        SHAPE_AREA.info().doc.as_deref(),
        Some("Area of the shape, computed once.")
    );
}

#[test]
fn method_self_uses_attribute_name_as_method_name() {
    let attr = LazyAttr::<dyn Shape, f64>::named("compute_area")
        .method_self(|shape| Produced::Cache(shape.compute_area()))
        .build()
        .unwrap();

    assert_eq!(attr.info().source_name, "compute_area");
    assert_eq!(attr.info().source, SourceKind::Method);
}
