use crate::element::{IndexShapeResolver, StandardElementResolver};
use crate::form::{Argument, Coefficient, CoefficientId, FormData, IntegralData, IntegralType, Restriction, SubdomainId};
use crate::kernel::{
    cell_orientation_expression, cell_orientations_arg, cell_orientations_variable, coefficient_name,
    prepare_arguments, prepare_coefficient, ArgDecl, Block, FunctionDecl, Kernel, Qualifier, FACET_NAME,
};
use crate::settings::KernelSettings;
use eyre::eyre;
use fenris_tensor::{variable_index, Expr, Index, IndexItem};
use fenris_traits::ScalarType;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

/// How facet numbers are made available to a kernel, decided by the integral type.
#[derive(Debug, Clone)]
pub enum FacetNumbering<T> {
    /// The integral is not over facets, or its facets are identified by the integral type.
    NotApplicable,
    /// A single facet number, read from `facet[0]` at runtime.
    Exterior { facet: IndexItem<T> },
    /// One facet number per side, read from `facet[0]` and `facet[1]` at runtime.
    Interior { plus: IndexItem<T>, minus: IndexItem<T> },
    /// Horizontal facets of an extruded mesh: the `+` side always sees its top facet (1),
    /// the `-` side its bottom facet (0).
    Horizontal,
}

impl<T> FacetNumbering<T> {
    pub fn for_integral_type(integral_type: IntegralType) -> Self {
        let facet_entry = |sides: usize, side: usize| {
            let facet = Expr::variable(FACET_NAME, &[sides]);
            variable_index(Expr::indexed(&facet, vec![IndexItem::Fixed(side)]))
        };
        match integral_type {
            IntegralType::ExteriorFacet | IntegralType::ExteriorFacetVert => FacetNumbering::Exterior {
                facet: facet_entry(1, 0),
            },
            IntegralType::InteriorFacet | IntegralType::InteriorFacetVert => FacetNumbering::Interior {
                plus: facet_entry(2, 0),
                minus: facet_entry(2, 1),
            },
            IntegralType::InteriorFacetHoriz => FacetNumbering::Horizontal,
            IntegralType::Cell
            | IntegralType::ExteriorFacetTop
            | IntegralType::ExteriorFacetBottom
            | IntegralType::Vertex => FacetNumbering::NotApplicable,
        }
    }

    /// Declaration of the `facet` argument, if the facet numbers are passed at runtime.
    pub fn argument(&self) -> Option<ArgDecl> {
        let sides = match self {
            FacetNumbering::Exterior { .. } => 1,
            FacetNumbering::Interior { .. } => 2,
            FacetNumbering::NotApplicable | FacetNumbering::Horizontal => return None,
        };
        Some(
            ArgDecl::new("unsigned int", FACET_NAME)
                .with_rank(vec![sides])
                .with_qualifier(Qualifier::Const),
        )
    }
}

impl<T: Clone> FacetNumbering<T> {
    /// The facet number seen from the given side.
    ///
    /// # Panics
    ///
    /// Panics if the restriction does not apply to this kind of integral.
    pub fn facet_number(&self, restriction: Option<Restriction>) -> IndexItem<T> {
        match (self, restriction) {
            (FacetNumbering::Exterior { facet }, None) => facet.clone(),
            (FacetNumbering::Interior { plus, .. }, Some(Restriction::Plus)) => plus.clone(),
            (FacetNumbering::Interior { minus, .. }, Some(Restriction::Minus)) => minus.clone(),
            (FacetNumbering::Horizontal, Some(Restriction::Plus)) => IndexItem::Fixed(1),
            (FacetNumbering::Horizontal, Some(Restriction::Minus)) => IndexItem::Fixed(0),
            (FacetNumbering::NotApplicable, _) => panic!("Facet numbers are not defined for this integral type"),
            (_, restriction) => panic!("No facet number available for restriction {:?}", restriction),
        }
    }
}

/// Builds the interface of a single kernel.
///
/// The driver compiling an integral creates one builder, binds the arguments, the coordinate
/// field and the coefficients while lowering the integrand (using the expressions the builder
/// hands out), and finally turns the builder into a [`Kernel`] with
/// [`finalize`](Self::finalize). The argument list of the kernel depends only on what was
/// bound and in which order, never on hash map iteration order.
#[derive(Debug)]
pub struct KernelBuilder<T, R = StandardElementResolver> {
    resolver: R,
    settings: KernelSettings,
    integral_type: IntegralType,
    subdomain_id: SubdomainId,
    domain_number: usize,
    interior_facet: bool,
    oriented: bool,

    local_tensor: Option<ArgDecl>,
    coordinates_arg: Option<ArgDecl>,
    coefficients_set: bool,
    coefficient_args: Vec<ArgDecl>,
    coefficient_numbers: Vec<usize>,
    coefficient_arity: Vec<usize>,

    coefficient_map: FxHashMap<CoefficientId, Expr<T>>,
    coefficient_split: FxHashMap<CoefficientId, Vec<Coefficient>>,

    cell_orientations: Expr<T>,
    facet_numbering: FacetNumbering<T>,
}

impl<T, R> KernelBuilder<T, R>
where
    T: ScalarType,
    R: IndexShapeResolver,
{
    pub fn new(integral_type: IntegralType, subdomain_id: SubdomainId, domain_number: usize, resolver: R) -> Self {
        let interior_facet = integral_type.is_interior_facet();
        Self {
            resolver,
            settings: KernelSettings::default(),
            integral_type,
            subdomain_id,
            domain_number,
            interior_facet,
            oriented: false,
            local_tensor: None,
            coordinates_arg: None,
            coefficients_set: false,
            coefficient_args: Vec::new(),
            coefficient_numbers: Vec::new(),
            coefficient_arity: Vec::new(),
            coefficient_map: FxHashMap::default(),
            coefficient_split: FxHashMap::default(),
            cell_orientations: cell_orientations_variable(interior_facet),
            facet_numbering: FacetNumbering::for_integral_type(integral_type),
        }
    }

    pub fn from_integral_data(integral_data: &IntegralData, resolver: R) -> Self {
        Self::new(
            integral_data.integral_type,
            integral_data.subdomain_id,
            integral_data.domain_number,
            resolver,
        )
    }

    pub fn with_settings(self, settings: KernelSettings) -> Self {
        Self { settings, ..self }
    }

    pub fn integral_type(&self) -> IntegralType {
        self.integral_type
    }

    /// Whether the kernel couples the two cells adjacent to an interior facet.
    pub fn interior_facet(&self) -> bool {
        self.interior_facet
    }

    /// Binds the arguments of the form and returns the expressions of the accumulator entries
    /// the kernel contributes to.
    ///
    /// See [`prepare_arguments`] for the number and order of the expressions.
    pub fn set_arguments(&mut self, arguments: &[Argument], indices: &[Vec<Index>]) -> eyre::Result<Vec<Expr<T>>> {
        if self.local_tensor.is_some() {
            return Err(eyre!("arguments have already been set"));
        }
        let (funarg, expressions) = prepare_arguments(arguments, indices, self.interior_facet, &self.resolver)?;
        debug!(
            "Bound {} argument(s) to accumulator {} with {} expression(s)",
            arguments.len(),
            funarg,
            expressions.len()
        );
        self.local_tensor = Some(funarg);
        Ok(expressions)
    }

    /// Binds the coordinate field of the mesh.
    ///
    /// Fails if the coordinates have already been set, or if the coefficient is already bound
    /// as a coefficient of the integral.
    pub fn set_coordinates(&mut self, coefficient: &Coefficient, name: &str) -> eyre::Result<()> {
        if self.coordinates_arg.is_some() {
            return Err(eyre!("coordinates have already been set"));
        }
        if self.coefficient_map.contains_key(&coefficient.id()) {
            return Err(eyre!("coefficient {:?} is already bound", coefficient.id()));
        }
        let funarg = self.bind_coefficient(coefficient, name)?;
        debug!("Bound coordinates as {}", funarg);
        self.coordinates_arg = Some(funarg);
        Ok(())
    }

    /// Binds the coefficients the integral needs.
    ///
    /// Coefficients are bound in the order of the reduced coefficients of the form, skipping
    /// the ones the integral does not use. Mixed coefficients are split into one coefficient
    /// per sub-element, each passed as its own argument.
    ///
    /// The recorded coefficient positions refer to a single form, so this can only be called
    /// once. It also fails if a coefficient is already bound (as the coordinates, or twice in
    /// the same form). A failed call binds nothing.
    pub fn set_coefficients(&mut self, integral_data: &IntegralData, form_data: &FormData) -> eyre::Result<()> {
        if self.coefficients_set {
            return Err(eyre!("coefficients have already been set"));
        }
        let enabled = &integral_data.enabled_coefficients;
        let reduced = &form_data.reduced_coefficients;
        let positions = &form_data.original_coefficient_positions;
        if enabled.len() != reduced.len() {
            return Err(eyre!(
                "integral has {} enabled coefficient flags, but the form has {} reduced coefficients",
                enabled.len(),
                reduced.len()
            ));
        }
        if positions.len() != reduced.len() {
            return Err(eyre!(
                "form has {} original coefficient positions for {} reduced coefficients",
                positions.len(),
                reduced.len()
            ));
        }

        // Nothing is bound unless every coefficient can be prepared
        let mut coefficients = Vec::new();
        let mut numbers = Vec::new();
        let mut arity = Vec::new();
        let mut splits = Vec::new();
        let mut seen = FxHashSet::default();
        for ((coefficient, &position), _) in reduced
            .iter()
            .zip(positions)
            .zip(enabled)
            .filter(|(_, enabled)| **enabled)
        {
            if self.coefficient_map.contains_key(&coefficient.id()) || !seen.insert(coefficient.id()) {
                return Err(eyre!(
                    "coefficient {:?} at position {} is already bound",
                    coefficient.id(),
                    position
                ));
            }
            if coefficient.element().is_mixed() {
                let sub_elements = coefficient.element().sub_elements();
                if sub_elements.is_empty() {
                    return Err(eyre!("mixed coefficient at position {} has no sub-elements", position));
                }
                let split: Vec<Coefficient> = sub_elements
                    .iter()
                    .map(|element| Coefficient::new(element.clone()))
                    .collect();
                debug!(
                    "Split mixed coefficient at position {} into {} sub-coefficients",
                    position,
                    split.len()
                );
                coefficients.extend(split.iter().cloned());
                arity.push(split.len());
                splits.push((coefficient.id(), split));
            } else {
                coefficients.push(coefficient.clone());
                arity.push(1);
            }
            numbers.push(position);
        }

        let mut prepared = Vec::with_capacity(coefficients.len());
        for (i, coefficient) in coefficients.iter().enumerate() {
            let name = coefficient_name(i);
            let (funarg, expression) = prepare_coefficient(coefficient, &name, self.interior_facet, &self.resolver)?;
            prepared.push((coefficient.id(), funarg, expression));
        }

        let mut args = Vec::with_capacity(prepared.len());
        for (id, funarg, expression) in prepared {
            debug!("Bound coefficient {}", funarg);
            self.coefficient_map.insert(id, expression);
            args.push(funarg);
        }
        self.coefficient_args.extend(args);
        self.coefficient_numbers.extend(numbers);
        self.coefficient_arity.extend(arity);
        self.coefficient_split.extend(splits);
        self.coefficients_set = true;
        Ok(())
    }

    /// Requires the kernel to take the cell orientations as an argument.
    pub fn require_cell_orientations(&mut self) {
        if !self.oriented {
            debug!("Kernel requires cell orientations");
        }
        self.oriented = true;
    }

    /// The orientation sign (1 or -1) of the cell on the given side.
    ///
    /// See [`cell_orientation_expression`].
    ///
    /// # Panics
    ///
    /// Panics if `restriction` is `Minus` for an integral that is not over interior facets.
    pub fn cell_orientation(&self, restriction: Option<Restriction>) -> Expr<T> {
        assert!(
            self.interior_facet || restriction != Some(Restriction::Minus),
            "Only interior facet integrals have a '-' side"
        );
        cell_orientation_expression(&self.cell_orientations, restriction)
    }

    /// The facet number seen from the given side.
    ///
    /// # Panics
    ///
    /// Panics if the integral is not over facets, or if the restriction does not apply to it.
    pub fn facet_number(&self, restriction: Option<Restriction>) -> IndexItem<T> {
        self.facet_numbering.facet_number(restriction)
    }

    /// The expression through which the kernel reads a bound coefficient.
    ///
    /// On interior facets the expression is restricted to the given side. Constant coefficients
    /// are the same on both sides and are returned as bound.
    ///
    /// # Panics
    ///
    /// Panics if the coefficient has not been bound. That is a bug in the caller, which has
    /// referred to a coefficient the integral was not prepared for. Also panics if a
    /// restriction is given outside interior facet integrals or missing inside them.
    pub fn coefficient(&self, coefficient: &Coefficient, restriction: Option<Restriction>) -> Expr<T> {
        let expression = self.coefficient_map.get(&coefficient.id()).unwrap_or_else(|| {
            panic!(
                "Coefficient {:?} has not been bound to this kernel",
                coefficient.id()
            )
        });
        if coefficient.is_real() {
            return expression.clone();
        }
        match (self.interior_facet, restriction) {
            (true, Some(restriction)) => Expr::partial_indexed(expression, vec![IndexItem::Fixed(restriction.side())]),
            (false, None) => expression.clone(),
            (true, None) => panic!("Coefficients on interior facets must be restricted"),
            (false, Some(_)) => panic!("Only coefficients on interior facets can be restricted"),
        }
    }

    /// The sub-coefficients a mixed coefficient was split into, in sub-element order.
    pub fn coefficient_split(&self, coefficient: &Coefficient) -> Option<&[Coefficient]> {
        self.coefficient_split
            .get(&coefficient.id())
            .map(Vec::as_slice)
    }

    /// Expressions for a coefficient, resolving mixed coefficients through their split.
    ///
    /// Returns one expression per sub-element for mixed coefficients and a single expression
    /// otherwise.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`coefficient`](Self::coefficient).
    pub fn coefficient_expressions(&self, coefficient: &Coefficient, restriction: Option<Restriction>) -> Vec<Expr<T>> {
        match self.coefficient_split(coefficient) {
            Some(split) => split
                .iter()
                .map(|sub_coefficient| self.coefficient(sub_coefficient, restriction))
                .collect(),
            None => vec![self.coefficient(coefficient, restriction)],
        }
    }

    /// Assembles the kernel.
    ///
    /// Fails if the arguments or the coordinates have not been set.
    pub fn finalize(self, name: &str, body: Block<T>) -> eyre::Result<Kernel<T>> {
        let local_tensor = self
            .local_tensor
            .ok_or_else(|| eyre!("cannot finalize kernel {} before the arguments are set", name))?;
        let coordinates = self
            .coordinates_arg
            .ok_or_else(|| eyre!("cannot finalize kernel {} before the coordinates are set", name))?;

        let mut args = vec![local_tensor, coordinates];
        if self.oriented {
            args.push(cell_orientations_arg());
        }
        args.extend(self.coefficient_args);
        if let Some(facet) = self.facet_numbering.argument() {
            args.push(facet);
        }

        let ast = FunctionDecl::new(self.settings.return_type, name, args, body)
            .with_qualifiers(self.settings.function_qualifiers);
        debug!("Finalized kernel {}", ast);

        Ok(Kernel {
            ast,
            integral_type: self.integral_type,
            oriented: self.oriented,
            subdomain_id: self.subdomain_id,
            domain_number: self.domain_number,
            coefficient_numbers: self.coefficient_numbers,
            coefficient_arity: self.coefficient_arity,
        })
    }

    fn bind_coefficient(&mut self, coefficient: &Coefficient, name: &str) -> eyre::Result<ArgDecl> {
        let (funarg, expression) = prepare_coefficient(coefficient, name, self.interior_facet, &self.resolver)?;
        self.coefficient_map.insert(coefficient.id(), expression);
        Ok(funarg)
    }
}
