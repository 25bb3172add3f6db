//! Component naming for Exodus result variables.
//!
//! Exodus stores every result as a set of scalar variables. A vector array is
//! split into one variable per component on write and regrouped from the
//! variable names on read:
//!
//! | components | variable names            | regrouped as |
//! |------------|---------------------------|--------------|
//! | 1          | `n`                       | `n`          |
//! | 2          | `n_r`, `n_z`              | `n_`         |
//! | 3          | `nx`, `ny`, `nz`          | `n`          |
//! | c > 3      | `n_1` .. `n_c`            | `n_`         |
//!
//! Global variables hold one value each. A field array with more than one
//! value is written as indexed globals, `n[i]` for a 1-D array and `n[i,j]`
//! for a `tuples × c` array, and regrouped by [`group_globals`].

/// Variable names for the components of array `name`.
pub fn component_names(name: &str, num_components: usize) -> Vec<String> {
    match num_components {
        0 | 1 => vec![name.to_string()],
        2 => vec![format!("{name}_r"), format!("{name}_z")],
        3 => ["x", "y", "z"].iter().map(|c| format!("{name}{c}")).collect(),
        n => (1..=n).map(|i| format!("{name}_{i}")).collect(),
    }
}

/// A run of scalar variables regrouped into one array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentGroup {
    pub name: String,
    /// Positions of the component variables in the input name list
    pub indices: Vec<usize>,
}

impl ComponentGroup {
    pub fn num_components(&self) -> usize {
        self.indices.len()
    }
}

/// Regroup consecutive component variables into arrays.
pub fn group_components(names: &[String]) -> Vec<ComponentGroup> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < names.len() {
        let rest = &names[i..];
        let (name, len) = xyz_run(rest)
            .or_else(|| rz_run(rest))
            .or_else(|| numbered_run(rest))
            .unwrap_or_else(|| (names[i].clone(), 1));
        groups.push(ComponentGroup {
            name,
            indices: (i..i + len).collect(),
        });
        i += len;
    }
    groups
}

fn xyz_run(names: &[String]) -> Option<(String, usize)> {
    let stem = names.first()?.strip_suffix('x')?;
    if stem.is_empty() {
        return None;
    }
    let y = names.get(1)?.strip_prefix(stem)?;
    let z = names.get(2)?.strip_prefix(stem)?;
    (y == "y" && z == "z").then(|| (stem.to_string(), 3))
}

fn rz_run(names: &[String]) -> Option<(String, usize)> {
    let stem = names.first()?.strip_suffix('r')?;
    if !stem.ends_with('_') || stem.len() < 2 {
        return None;
    }
    (names.get(1)?.strip_prefix(stem)? == "z").then(|| (stem.to_string(), 2))
}

fn numbered_run(names: &[String]) -> Option<(String, usize)> {
    let stem = names.first()?.strip_suffix("_1")?;
    if stem.is_empty() {
        return None;
    }
    let stem = format!("{stem}_");
    let len = names
        .iter()
        .zip(1..)
        .take_while(|(name, i)| name.strip_prefix(&stem) == Some(i.to_string().as_str()))
        .count();
    (len >= 2).then_some((stem, len))
}

/// Global variable names for the values of field array `name`.
pub fn global_names(name: &str, num_values: usize, num_components: usize) -> Vec<String> {
    if num_values == 1 && num_components <= 1 && !name.ends_with(']') {
        return vec![name.to_string()];
    }
    if num_components <= 1 {
        return (0..num_values).map(|i| format!("{name}[{i}]")).collect();
    }
    (0..num_values)
        .map(|k| format!("{name}[{},{}]", k / num_components, k % num_components))
        .collect()
}

/// A run of global variables regrouped into one field array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalGroup {
    pub name: String,
    /// Positions of the values in the input name list
    pub indices: Vec<usize>,
    pub num_components: usize,
}

/// Regroup indexed global variables into field arrays. Names without an index
/// stay single values.
pub fn group_globals(names: &[String]) -> Vec<GlobalGroup> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < names.len() {
        let group = indexed_run(&names[i..], i).unwrap_or_else(|| GlobalGroup {
            name: names[i].clone(),
            indices: vec![i],
            num_components: 1,
        });
        i += group.indices.len();
        groups.push(group);
    }
    groups
}

/// `stem[i]` or `stem[i,j]`
fn split_index(name: &str) -> Option<(&str, Vec<usize>)> {
    let (stem, index) = name.strip_suffix(']')?.rsplit_once('[')?;
    let index = index
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<Vec<usize>>>()?;
    (!stem.is_empty() && (1..=2).contains(&index.len())).then_some((stem, index))
}

fn indexed_run(names: &[String], offset: usize) -> Option<GlobalGroup> {
    let (stem, first) = split_index(names.first()?)?;
    let arity = first.len();
    let run: Vec<Vec<usize>> = names
        .iter()
        .map_while(|name| {
            split_index(name)
                .filter(|(s, index)| *s == stem && index.len() == arity)
                .map(|(_, index)| index)
        })
        .collect();

    let num_components = if arity == 1 {
        1
    } else {
        run.iter()
            .zip(0..)
            .take_while(|(index, j)| index[0] == 0 && index[1] == *j)
            .count()
    };
    if num_components == 0 {
        return None;
    }
    let mut len = run
        .iter()
        .zip(0..)
        .take_while(|(index, k)| match arity {
            1 => index[0] == *k,
            _ => index[0] == k / num_components && index[1] == k % num_components,
        })
        .count();
    len -= len % num_components;
    (len > 0).then(|| GlobalGroup {
        name: stem.to_string(),
        indices: (offset..offset + len).collect(),
        num_components,
    })
}

/// Split tuple-major `values` into one vector per component.
pub fn split_components(values: &[f64], num_components: usize) -> Vec<Vec<f64>> {
    let c = num_components.max(1);
    (0..c)
        .map(|k| values.iter().skip(k).step_by(c).copied().collect())
        .collect()
}

/// Inverse of [`split_components`]. All components must have equal length.
pub fn interleave(components: &[Vec<f64>]) -> Vec<f64> {
    let len = components.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(len * components.len());
    for i in 0..len {
        out.extend(components.iter().map(|c| c[i]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn names_per_component_count() {
        assert_eq!(component_names("p", 1), strings(&["p"]));
        assert_eq!(component_names("v", 2), strings(&["v_r", "v_z"]));
        assert_eq!(component_names("u_", 3), strings(&["u_x", "u_y", "u_z"]));
        assert_eq!(component_names("s", 4), strings(&["s_1", "s_2", "s_3", "s_4"]));
    }

    #[test]
    fn groups_written_names_back() {
        let mut names = Vec::new();
        for (name, c) in [("p", 1), ("v", 2), ("velocity_", 3), ("stress", 6)] {
            names.extend(component_names(name, c));
        }
        let groups = group_components(&names);
        let summary: Vec<_> = groups
            .iter()
            .map(|g| (g.name.as_str(), g.num_components()))
            .collect();
        assert_eq!(
            summary,
            vec![("p", 1), ("v_", 2), ("velocity_", 3), ("stress_", 6)]
        );
        assert_eq!(groups[2].indices, vec![3, 4, 5]);
    }

    #[test]
    fn unmatched_names_stay_scalar() {
        let names = strings(&["x", "y", "z", "ax", "ay", "temp_1", "r_r"]);
        let groups = group_components(&names);
        let summary: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(summary, vec!["x", "y", "z", "ax", "ay", "temp_1", "r_r"]);
    }

    #[test]
    fn global_names_index_multi_value_arrays() {
        assert_eq!(global_names("dt", 1, 1), strings(&["dt"]));
        assert_eq!(global_names("dt", 2, 1), strings(&["dt[0]", "dt[1]"]));
        assert_eq!(
            global_names("basis", 4, 2),
            strings(&["basis[0,0]", "basis[0,1]", "basis[1,0]", "basis[1,1]"])
        );
        assert_eq!(global_names("a[0]", 1, 1), strings(&["a[0][0]"]));
    }

    #[test]
    fn groups_globals_back_into_field_arrays() {
        let mut names = Vec::new();
        for (name, values, c) in [("dt", 2, 1), ("time", 1, 1), ("basis", 6, 3), ("a[0]", 1, 1)] {
            names.extend(global_names(name, values, c));
        }
        let summary: Vec<_> = group_globals(&names)
            .into_iter()
            .map(|g| (g.name, g.indices.len(), g.num_components))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("dt".to_string(), 2, 1),
                ("time".to_string(), 1, 1),
                ("basis".to_string(), 6, 3),
                ("a[0]".to_string(), 1, 1),
            ]
        );
    }

    #[test]
    fn foreign_global_names_stay_scalar() {
        let names = strings(&["KE", "x[1]", "y[0,1]", "[0]"]);
        let summary: Vec<_> = group_globals(&names).into_iter().map(|g| g.name).collect();
        assert_eq!(summary, vec!["KE", "x[1]", "y[0,1]", "[0]"]);
    }

    #[test]
    fn split_and_interleave_are_inverse() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let parts = split_components(&values, 3);
        assert_eq!(parts, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
        assert_eq!(interleave(&parts), values);
    }
}
