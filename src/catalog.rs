//! Catalog
//!
//! Prebuilt hierarchies for each shape of inheritance: single, multiple, multilevel,
//! hierarchical and hybrid, plus a bank account whose withdrawals are balance checked

use crate::error::Result;
use crate::hierarchy::{Hierarchy, NodeDef};
use crate::value::Value;

/// Defines a capability that says a fixed line
fn says(def: NodeDef, capability: &str, line: &'static str) -> NodeDef {
    def.capability(capability, move |slf| {
        slf.say(line);
        Ok(None)
    })
}

/// Copies constructor arguments into attributes, in order
fn init_from_args(def: NodeDef, attributes: &'static [&'static str]) -> NodeDef {
    def.capability("init", move |slf| {
        for (index, attribute) in attributes.iter().enumerate() {
            let value: Value = slf.arg(index)?;
            slf.set(*attribute, value);
        }
        Ok(None)
    })
}

/// `Animal -> Dog`, `Vehicle -> Car` (with a chained constructor) and
/// `Employee -> Manager`
pub fn single_inheritance() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(says(NodeDef::new("Animal"), "speak", "Animals can make sounds."))
        .node(says(
            NodeDef::new("Dog").parent("Animal"),
            "bark",
            "Dog barks: Woof! Woof!",
        ))
        .node(
            init_from_args(NodeDef::new("Vehicle"), &["brand"]).capability("move", |slf| {
                let brand: String = slf.get("brand")?;
                slf.say(format!("{} Vehicle is moving.", brand));
                Ok(None)
            }),
        )
        .node(
            NodeDef::new("Car")
                .parent("Vehicle")
                .capability("init", |slf| {
                    let brand: Value = slf.arg(0)?;
                    slf.invoke_super("init", [brand])?;
                    let model: Value = slf.arg(1)?;
                    slf.set("model", model);
                    Ok(None)
                })
                .capability("info", |slf| {
                    let line = format!("Car Info: {} {}", slf.attr("brand")?, slf.attr("model")?);
                    slf.say(line);
                    Ok(None)
                }),
        )
        .node(
            init_from_args(NodeDef::new("Employee"), &["name", "salary"]).capability(
                "details",
                |slf| {
                    let line = format!("Employee: {}, Salary: {}", slf.attr("name")?, slf.attr("salary")?);
                    slf.say(line);
                    Ok(None)
                },
            ),
        )
        .node(
            NodeDef::new("Manager")
                .parent("Employee")
                .capability("manage", |slf| {
                    let line = format!("Manager {} is managing the team.", slf.attr("name")?);
                    slf.say(line);
                    Ok(None)
                }),
        )
        .build()
}

/// `Father + Mother -> Child`
pub fn multiple_inheritance() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(says(NodeDef::new("Father"), "skill", "Father: Knows driving."))
        .node(says(NodeDef::new("Mother"), "talent", "Mother: Knows cooking."))
        .node(says(
            NodeDef::new("Child").parents(["Father", "Mother"]),
            "hobby",
            "Child: Loves painting.",
        ))
        .build()
}

/// `Vehicle -> Car -> ElectricCar`
pub fn multilevel_inheritance() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(says(NodeDef::new("Vehicle"), "move", "Vehicle is moving."))
        .node(says(
            NodeDef::new("Car").parent("Vehicle"),
            "fuel",
            "Car uses petrol or diesel.",
        ))
        .node(says(
            NodeDef::new("ElectricCar").parent("Car"),
            "charge",
            "ElectricCar charges with electricity.",
        ))
        .build()
}

/// `Shape -> Circle, Square`, where both children define their own `area`
#[allow(clippy::approx_constant)]
pub fn hierarchical_inheritance() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(says(NodeDef::new("Shape"), "draw", "Drawing a shape."))
        .node(NodeDef::new("Circle").parent("Shape").capability("area", |slf| {
            let r: f64 = slf.arg(0)?;
            let area = Value::from(3.14 * r * r);
            slf.say(format!("Area of Circle: {}", area));
            Ok(Some(area))
        }))
        .node(NodeDef::new("Square").parent("Shape").capability("area", |slf| {
            // integer sides keep an integer area
            let area = match slf.arg::<Value>(0)? {
                Value::Int(s) => Value::from(s.checked_mul(s).ok_or_else(|| slf.overflow())?),
                _ => {
                    let s: f64 = slf.arg(0)?;
                    Value::from(s * s)
                }
            };
            slf.say(format!("Area of Square: {}", area));
            Ok(Some(area))
        }))
        .build()
}

/// The `A, B(A), C(A), D(B, C)` diamond and `Device -> Mobile & Computer -> SmartPhone`
pub fn hybrid_inheritance() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(says(NodeDef::new("A"), "featureA", "Feature A"))
        .node(says(NodeDef::new("B").parent("A"), "featureB", "Feature B"))
        .node(says(NodeDef::new("C").parent("A"), "featureC", "Feature C"))
        .node(says(
            NodeDef::new("D").parents(["B", "C"]),
            "featureD",
            "Feature D",
        ))
        .node(says(NodeDef::new("Device"), "power", "Device has power."))
        .node(says(
            NodeDef::new("Mobile").parent("Device"),
            "call",
            "Mobile can make calls.",
        ))
        .node(says(
            NodeDef::new("Computer").parent("Device"),
            "compute",
            "Computer can compute.",
        ))
        .node(says(
            NodeDef::new("SmartPhone").parents(["Mobile", "Computer"]),
            "feature",
            "SmartPhone combines both features.",
        ))
        .build()
}

/// `BankAccount`, the one example with a guarded state change
///
/// A withdrawal larger than the balance leaves the balance untouched and says
/// "Insufficient funds", it is not an error
pub fn bank() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(
            init_from_args(
                NodeDef::new("BankAccount"),
                &["acc_num", "balance", "holder", "branch", "bank_name"],
            )
            .capability("deposit", |slf| {
                let amount: i64 = slf.arg(0)?;
                let balance = slf
                    .get::<i64>("balance")?
                    .checked_add(amount)
                    .ok_or_else(|| slf.overflow())?;
                slf.set("balance", balance);
                let line = format!("{} deposited {}. Balance = {}", slf.attr("holder")?, amount, balance);
                slf.say(line);
                Ok(Some(Value::from(balance)))
            })
            .capability("withdraw", |slf| {
                let amount: i64 = slf.arg(0)?;
                let balance: i64 = slf.get("balance")?;
                if amount <= balance {
                    let balance = balance.checked_sub(amount).ok_or_else(|| slf.overflow())?;
                    slf.set("balance", balance);
                    let line = format!("{} withdrew {}. Balance = {}", slf.attr("holder")?, amount, balance);
                    slf.say(line);
                } else {
                    slf.say("Insufficient funds");
                }
                Ok(Some(Value::from(slf.get::<i64>("balance")?)))
            })
            .capability("check_balance", |slf| {
                let balance = slf.attr("balance")?.clone();
                Ok(Some(balance))
            }),
        )
        .build()
}

/// Copies constructor arguments into attributes like [init_from_args], then starts
/// `list` out empty
fn init_with_list(def: NodeDef, attributes: &'static [&'static str], list: &'static str) -> NodeDef {
    def.capability("init", move |slf| {
        for (index, attribute) in attributes.iter().enumerate() {
            let value: Value = slf.arg(index)?;
            slf.set(*attribute, value);
        }
        slf.set(list, Vec::<Value>::new());
        Ok(None)
    })
}

/// `ShoppingCart` and `School`, each keeping a list attribute that grows one entry
/// per call
pub fn collections() -> Result<Hierarchy> {
    Hierarchy::builder()
        .node(
            init_with_list(
                NodeDef::new("ShoppingCart"),
                &["user", "date", "store", "cart_id", "location"],
                "items",
            )
            .capability("add_item", |slf| {
                let item: Value = slf.arg(0)?;
                let mut items: Vec<Value> = slf.get("items")?;
                items.push(item.clone());
                slf.set("items", items);
                let line = format!("{} added to cart {}", item, slf.attr("cart_id")?);
                slf.say(line);
                Ok(None)
            })
            .capability("show_cart", |slf| {
                let line = format!(
                    "Cart {} ({}) Items: {}",
                    slf.attr("cart_id")?,
                    slf.attr("user")?,
                    slf.attr("items")?
                );
                slf.say(line);
                Ok(None)
            }),
        )
        .node(
            init_with_list(
                NodeDef::new("School"),
                &["name", "location", "board", "principal", "established_year"],
                "students",
            )
            .capability("add_student", |slf| {
                let student: Value = slf.arg(0)?;
                let mut students: Vec<Value> = slf.get("students")?;
                students.push(student.clone());
                slf.set("students", students);
                let line = format!("{} admitted to {}", student, slf.attr("name")?);
                slf.say(line);
                Ok(None)
            })
            .capability("show_students", |slf| {
                let line = format!("Students in {}: {}", slf.attr("name")?, slf.attr("students")?);
                slf.say(line);
                Ok(None)
            }),
        )
        .build()
}

#[cfg(test)]
mod test {
    use super::{bank, collections, hierarchical_inheritance, multilevel_inheritance};
    use crate::error::LineageError;
    use crate::session::Session;
    use crate::transcript::Recorded;
    use crate::value::Value;

    #[test]
    fn every_catalog_hierarchy_builds() {
        assert_eq!(super::single_inheritance().unwrap().len(), 6);
        assert_eq!(super::multiple_inheritance().unwrap().len(), 3);
        assert_eq!(multilevel_inheritance().unwrap().len(), 3);
        assert_eq!(hierarchical_inheritance().unwrap().len(), 3);
        assert_eq!(super::hybrid_inheritance().unwrap().len(), 8);
        assert_eq!(bank().unwrap().len(), 1);
        assert_eq!(collections().unwrap().len(), 2);
    }

    #[test]
    fn polymorphic_area() {
        let hierarchy = hierarchical_inheritance().unwrap();
        let mut session = Session::new(&hierarchy, Recorded::default());

        let mut circle = session.create("Circle", args![]).unwrap();
        let mut square = session.create("Square", args![]).unwrap();

        assert_eq!(
            session.invoke(&mut circle, "area", args![5]).unwrap(),
            Some(Value::Float(78.5))
        );
        assert_eq!(
            session.invoke(&mut square, "area", args![4]).unwrap(),
            Some(Value::Int(16))
        );
        assert_eq!(
            session.transcript().lines(),
            ["Area of Circle: 78.5", "Area of Square: 16"]
        );
    }

    #[test]
    fn integer_square_overflow_is_an_error() {
        let hierarchy = hierarchical_inheritance().unwrap();
        let mut session = Session::new(&hierarchy, Recorded::default());
        let mut square = session.create("Square", args![]).unwrap();

        let err = session
            .invoke(&mut square, "area", args![1i64 << 32])
            .unwrap_err();
        assert_eq!(
            err,
            LineageError::ArithmeticOverflow {
                capability: "area".to_string()
            }
        );
        assert!(session.transcript().lines().is_empty());

        // the largest side whose square still fits
        assert_eq!(
            session.invoke(&mut square, "area", args![3_037_000_499i64]).unwrap(),
            Some(Value::Int(3_037_000_499i64 * 3_037_000_499i64))
        );
    }

    #[test]
    fn list_attributes_grow_per_instance() {
        let hierarchy = collections().unwrap();
        let mut session = Session::new(&hierarchy, Recorded::default());

        let mut c1 = session
            .create("ShoppingCart", args!["Anil", "2025-08-26", "Amazon", 101, "Delhi"])
            .unwrap();
        let mut c2 = session
            .create("ShoppingCart", args!["Sonia", "2025-08-26", "Flipkart", 102, "Mumbai"])
            .unwrap();
        session.invoke(&mut c1, "add_item", args!["Laptop"]).unwrap();
        session.invoke(&mut c1, "show_cart", args![]).unwrap();
        session.invoke(&mut c2, "add_item", args!["Shoes"]).unwrap();
        session.invoke(&mut c2, "show_cart", args![]).unwrap();

        let mut school = session
            .create(
                "School",
                args!["Green Valley School", "Delhi", "CBSE", "Mr. Sharma", 1995],
            )
            .unwrap();
        session.invoke(&mut school, "add_student", args!["Ravi"]).unwrap();
        session.invoke(&mut school, "add_student", args!["Sneha"]).unwrap();
        session.invoke(&mut school, "show_students", args![]).unwrap();

        assert_eq!(
            session.transcript().lines(),
            [
                "Laptop added to cart 101",
                "Cart 101 (Anil) Items: ['Laptop']",
                "Shoes added to cart 102",
                "Cart 102 (Sonia) Items: ['Shoes']",
                "Ravi admitted to Green Valley School",
                "Sneha admitted to Green Valley School",
                "Students in Green Valley School: ['Ravi', 'Sneha']",
            ]
        );
        assert_eq!(c1.attr("items"), Some(&Value::from(args!["Laptop"])));
    }
}
