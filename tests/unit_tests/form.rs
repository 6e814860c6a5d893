use fenris_kernel::element::{Cell, Family, FiniteElement};
use fenris_kernel::form::{Coefficient, FormData, IntegralData, IntegralType, Restriction, SubdomainId};
use std::collections::HashSet;

#[test]
fn coefficients_are_compared_by_identity() {
    let element = FiniteElement::scalar(Family::Lagrange, Cell::Triangle, 1);
    let f = Coefficient::new(element.clone());
    let g = Coefficient::new(element);

    assert_ne!(f, g);
    assert_ne!(f.id(), g.id());
    assert_eq!(f, f.clone());
    assert_eq!(f.element(), g.element());

    let set: HashSet<_> = vec![f.clone(), g.clone(), f.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn integral_type_round_trips_through_strings() {
    for integral_type in IntegralType::ALL {
        let parsed: IntegralType = integral_type.as_str().parse().unwrap();
        assert_eq!(parsed, integral_type);
        assert_eq!(integral_type.to_string(), integral_type.as_str());
    }
    assert!("interior_facet_diagonal".parse::<IntegralType>().is_err());
}

#[test]
fn interior_facet_classification() {
    let interior: Vec<_> = IntegralType::ALL
        .iter()
        .filter(|integral_type| integral_type.is_interior_facet())
        .copied()
        .collect();
    assert_eq!(
        interior,
        vec![
            IntegralType::InteriorFacet,
            IntegralType::InteriorFacetVert,
            IntegralType::InteriorFacetHoriz
        ]
    );
}

#[test]
fn integral_data_deserializes_from_json() {
    let json = r#"{
        "integral_type": "exterior_facet_vert",
        "subdomain_id": { "id": 3 },
        "domain_number": 0,
        "enabled_coefficients": [true, false]
    }"#;
    let data: IntegralData = serde_json::from_str(json).unwrap();
    assert_eq!(data.integral_type, IntegralType::ExteriorFacetVert);
    assert_eq!(data.subdomain_id, SubdomainId::Id(3));
    assert_eq!(data.enabled_coefficients, vec![true, false]);

    let everywhere: SubdomainId = serde_json::from_str(r#""everywhere""#).unwrap();
    assert_eq!(everywhere, SubdomainId::Everywhere);
}

#[test]
fn subdomain_id_display() {
    assert_eq!(SubdomainId::Everywhere.to_string(), "everywhere");
    assert_eq!(SubdomainId::Otherwise.to_string(), "otherwise");
    assert_eq!(SubdomainId::Id(7).to_string(), "7");
}

#[test]
fn restriction_sides() {
    assert_eq!(Restriction::Plus.side(), 0);
    assert_eq!(Restriction::Minus.side(), 1);
    assert_eq!(Restriction::Plus.to_string(), "+");
    assert_eq!(Restriction::Minus.to_string(), "-");
    assert_eq!(serde_json::to_string(&Restriction::Minus).unwrap(), r#""-""#);
}

#[test]
fn form_data_from_coefficients_uses_identity_positions() {
    let element = FiniteElement::scalar(Family::DiscontinuousLagrange, Cell::Interval, 0);
    let coefficients = vec![Coefficient::new(element.clone()), Coefficient::new(element)];
    let form_data = FormData::from_coefficients(coefficients.clone());
    assert_eq!(form_data.reduced_coefficients, coefficients);
    assert_eq!(form_data.original_coefficient_positions, vec![0, 1]);
}
