//! Construction-time variable resolution.
//!
//! A consumer names its variable through a parameter, either as a single
//! name or as a list whose first entry is used. [`VariableBinding`] is
//! the immutable result: which variable, on which thread, viewed in which
//! representation.

use std::marker::PhantomData;

use tessera_core::{
    FieldValue, InputParameters, Representation, ThreadId, VarKindFilter, VariableError,
    VariableId,
};
use tracing::debug;

use crate::store::{ThreadData, VariableArity, VariableHandle};
use crate::subproblem::Subproblem;
use crate::view::VariableView;

/// Read the variable name held by `param`.
///
/// The single-name form is tried first. If it is absent or empty the
/// list form is used and its first entry taken. Fails if neither form
/// yields a non-empty name, which usually means an input expression
/// expanded to `''`.
pub fn resolve_variable_name(
    object: &str,
    params: &InputParameters,
    param: &str,
) -> Result<String, VariableError> {
    let name = match params.get_single_name(param) {
        Some(name) if !name.is_empty() => Some(name),
        _ => params.get_name_list(param).first().map(String::as_str),
    };
    match name {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(VariableError::EmptyVariableName {
            object: object.to_string(),
            param: param.to_string(),
        }),
    }
}

/// Immutable binding from a consumer to one variable.
///
/// `T` fixes the expected arity: `Real` for scalar consumers,
/// `RealVectorValue` for vector consumers.
#[derive(Debug)]
pub struct VariableBinding<T: FieldValue> {
    handle: VariableHandle,
    name: String,
    thread: ThreadId,
    representation: Representation,
    _value: PhantomData<fn() -> T>,
}

impl<T: FieldValue> Clone for VariableBinding<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            name: self.name.clone(),
            thread: self.thread,
            representation: self.representation,
            _value: PhantomData,
        }
    }
}

impl<T: VariableArity> VariableBinding<T> {
    /// Start resolving a binding for the object `object` configured by
    /// `params`.
    ///
    /// Defaults: parameter `"variable"`, interpolated representation,
    /// nonlinear variables only.
    pub fn builder<'p>(object: &'p str, params: &'p InputParameters) -> BindingBuilder<'p, T> {
        BindingBuilder {
            object,
            params,
            param: "variable",
            explicit: None,
            representation: Representation::Interpolated,
            kind: VarKindFilter::Nonlinear,
            _value: PhantomData,
        }
    }

    /// Attach to a thread's data for the current computation phase.
    ///
    /// Fails if `data` belongs to another thread than the one captured
    /// at construction.
    pub fn attach<'a>(&self, data: &'a ThreadData) -> Result<VariableView<'a, T>, VariableError> {
        if data.thread() != self.thread {
            return Err(VariableError::ThreadMismatch {
                name: self.name.clone(),
                bound: self.thread,
                attached: data.thread(),
            });
        }
        let variable =
            data.variable::<T>(self.handle.id)
                .ok_or_else(|| VariableError::UnknownVariable {
                    name: self.name.clone(),
                    thread: self.thread,
                })?;
        Ok(VariableView::new(
            variable,
            data.assembly(),
            self.representation,
        ))
    }

    /// Attach to this binding's own thread in `subproblem`.
    pub fn view<'a>(&self, subproblem: &'a Subproblem) -> Result<VariableView<'a, T>, VariableError> {
        self.attach(subproblem.thread(self.thread)?)
    }
}

impl<T: FieldValue> VariableBinding<T> {
    /// Bound variable's ID.
    pub fn id(&self) -> VariableId {
        self.handle.id
    }

    /// Bound variable's registry handle.
    pub fn handle(&self) -> VariableHandle {
        self.handle
    }

    /// Bound variable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Thread captured at construction.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Representation fixed at construction.
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Whether accessors read nodal dof storage.
    pub fn is_nodal(&self) -> bool {
        self.representation == Representation::Nodal
    }
}

/// Builder for [`VariableBinding`].
pub struct BindingBuilder<'p, T> {
    object: &'p str,
    params: &'p InputParameters,
    param: &'p str,
    explicit: Option<&'p str>,
    representation: Representation,
    kind: VarKindFilter,
    _value: PhantomData<fn() -> T>,
}

impl<'p, T: VariableArity> BindingBuilder<'p, T> {
    /// Bind to `name` directly instead of reading the parameter. Used for
    /// parameters that list several variables, each bound separately;
    /// the parameter key is still reported if `name` is empty.
    pub fn name(mut self, name: &'p str) -> Self {
        self.explicit = Some(name);
        self
    }

    /// Parameter holding the variable name (default `"variable"`).
    pub fn param(mut self, param: &'p str) -> Self {
        self.param = param;
        self
    }

    /// Read nodal dof storage instead of quadrature-point storage.
    pub fn nodal(mut self, nodal: bool) -> Self {
        self.representation = if nodal {
            Representation::Nodal
        } else {
            Representation::Interpolated
        };
        self
    }

    /// Kind of variable accepted (default nonlinear).
    pub fn kind(mut self, kind: VarKindFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Resolve against `subproblem` for `thread`.
    ///
    /// # Errors
    ///
    /// - [`VariableError::EmptyVariableName`] if the parameter names no variable
    /// - [`VariableError::UnknownVariable`] / [`VariableError::UnknownThread`]
    ///   if the lookup fails
    /// - [`VariableError::KindMismatch`] / [`VariableError::ArityMismatch`]
    ///   if the variable is not what `T` and the kind filter expect
    pub fn resolve(
        self,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<VariableBinding<T>, VariableError> {
        let name = match self.explicit {
            Some(name) if !name.is_empty() => name.to_string(),
            Some(_) => {
                return Err(VariableError::EmptyVariableName {
                    object: self.object.to_string(),
                    param: self.param.to_string(),
                })
            }
            None => resolve_variable_name(self.object, self.params, self.param)?,
        };
        let handle = subproblem.resolve(thread, &name, self.kind, T::ARITY)?;
        debug!(
            object = self.object,
            param = self.param,
            variable = %name,
            thread = thread.0,
            representation = %self.representation,
            "bound variable"
        );
        Ok(VariableBinding {
            handle,
            name,
            thread,
            representation: self.representation,
            _value: PhantomData,
        })
    }
}
