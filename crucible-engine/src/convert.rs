//! Conversion of interpreter objects into JSON values.
//!
//! The return-value contract is a closed domain: null, booleans, finite
//! numbers, strings, and sequences/mappings of the same. Anything else —
//! sets, custom classes, non-finite floats, non-string keys — fails the
//! conversion, naming the offending type so the failure message is useful.

use rustpython_vm::builtins::{PyFloat, PyStr};
use rustpython_vm::{AsObject, PyObjectRef, TryFromObject, VirtualMachine};

/// Maximum nesting depth accepted from a returned object.
const MAX_DEPTH: usize = 64;

/// Convert a Python object into a [`serde_json::Value`].
///
/// # Errors
/// Returns a caller-facing message when the object leaves the JSON domain.
pub(crate) fn py_to_json(
    vm: &VirtualMachine,
    obj: &PyObjectRef,
    depth: usize,
) -> Result<serde_json::Value, String> {
    if depth > MAX_DEPTH {
        return Err(format!("return value nests deeper than {MAX_DEPTH} levels"));
    }
    if vm.is_none(obj) {
        return Ok(serde_json::Value::Null);
    }

    // bool is a subclass of int; it must win the class dispatch.
    if obj.fast_isinstance(vm.ctx.types.bool_type) {
        let b = bool::try_from_object(vm, obj.clone()).map_err(|_| type_error(vm, obj))?;
        return Ok(serde_json::Value::Bool(b));
    }
    if obj.fast_isinstance(vm.ctx.types.int_type) {
        let n = i64::try_from_object(vm, obj.clone())
            .map_err(|_| "return value contains an integer outside the 64-bit range".to_owned())?;
        return Ok(serde_json::Value::from(n));
    }
    if obj.fast_isinstance(vm.ctx.types.float_type) {
        let f = obj
            .payload::<PyFloat>()
            .map(PyFloat::to_f64)
            .ok_or_else(|| type_error(vm, obj))?;
        if !f.is_finite() {
            return Err("return value contains a non-finite number".to_owned());
        }
        let number = serde_json::Number::from_f64(f)
            .ok_or_else(|| "return value contains a non-finite number".to_owned())?;
        return Ok(serde_json::Value::Number(number));
    }
    if obj.fast_isinstance(vm.ctx.types.str_type) {
        let s = obj.payload::<PyStr>().ok_or_else(|| type_error(vm, obj))?;
        return Ok(serde_json::Value::String(s.as_str().to_owned()));
    }
    if obj.fast_isinstance(vm.ctx.types.list_type)
        || obj.fast_isinstance(vm.ctx.types.tuple_type)
    {
        let elements: Vec<PyObjectRef> =
            vm.extract_elements_with(obj, Ok).map_err(|_| type_error(vm, obj))?;
        let mut items = Vec::with_capacity(elements.len());
        for element in &elements {
            items.push(py_to_json(vm, element, depth + 1)?);
        }
        return Ok(serde_json::Value::Array(items));
    }
    if obj.fast_isinstance(vm.ctx.types.dict_type) {
        let pairs_obj = vm
            .call_method(obj, "items", ())
            .map_err(|_| type_error(vm, obj))?;
        let pairs: Vec<PyObjectRef> =
            vm.extract_elements_with(&pairs_obj, Ok).map_err(|_| type_error(vm, obj))?;
        let mut map = serde_json::Map::with_capacity(pairs.len());
        for pair in &pairs {
            let kv: Vec<PyObjectRef> =
                vm.extract_elements_with(pair, Ok).map_err(|_| type_error(vm, obj))?;
            let (key_obj, value_obj) = match kv.as_slice() {
                [k, v] => (k, v),
                _ => return Err(type_error(vm, obj)),
            };
            let Some(key) = key_obj.payload::<PyStr>() else {
                return Err(format!(
                    "return value contains a mapping key of type '{}'; keys must be strings",
                    key_obj.class().name()
                ));
            };
            map.insert(key.as_str().to_owned(), py_to_json(vm, value_obj, depth + 1)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    Err(type_error(vm, obj))
}

fn type_error(_vm: &VirtualMachine, obj: &PyObjectRef) -> String {
    format!(
        "return value of type '{}' is not JSON-serializable",
        obj.class().name()
    )
}
