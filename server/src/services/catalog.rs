// server/src/services/catalog.rs

use std::collections::HashMap;

use crate::models::{Department, DepartmentWithSubcategories, Subcategory};

/// Nests each subcategory under the department with the same number,
/// preserving the input order of both lists.
pub fn group_departments(departments: Vec<Department>, subcategories: Vec<Subcategory>) -> Vec<DepartmentWithSubcategories> {
  let mut by_department: HashMap<i32, Vec<Subcategory>> = HashMap::new();
  for sub in subcategories {
    by_department.entry(sub.department_number).or_default().push(sub);
  }
  departments
    .into_iter()
    .map(|d| DepartmentWithSubcategories {
      subcategories: by_department.remove(&d.department_number).unwrap_or_default(),
      name: d.name,
      department_number: d.department_number,
      image: d.image,
    })
    .collect()
}
