use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders tables so that FK parents are created before their children
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// Return all tables in dependency order (parents before children)
    pub fn all_tables_ordered(&self) -> Result<Vec<&'static TableSchema>, String> {
        let names: Vec<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        self.topological_sort(&names)
    }

    /// Topological sort of tables by dependencies.
    /// Ties keep the registry order so the result is deterministic.
    fn topological_sort(&self, included: &[&str]) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table_name in included {
            if !visited.contains(table_name) {
                self.visit(
                    table_name,
                    included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &[&'a str],
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        let table = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;

        // Walk FKs in declaration order rather than through the HashSet
        for fk in table.foreign_keys {
            let dep = fk.references_table;
            if dep != name && included.contains(&dep) && self.deps.contains_key(dep) {
                self.visit(dep, included, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);
        result.push(table);

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(names: &[&str], table: &str) -> usize {
        names.iter().position(|&n| n == table).unwrap()
    }

    #[test]
    fn test_parents_come_before_children() {
        let resolver = DependencyResolver::new();
        let tables = resolver.all_tables_ordered().unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name).collect();

        assert_eq!(names.len(), ALL_TABLES.len());
        assert!(position(&names, "district") < position(&names, "neighborhood"));
        for parent in [
            "stage",
            "work_type",
            "responsible_area",
            "district",
            "neighborhood",
            "company",
            "contract_type",
            "funding_source",
        ] {
            assert!(position(&names, parent) < position(&names, "project"));
        }
    }

    #[test]
    fn test_unknown_table_error() {
        let resolver = DependencyResolver::new();
        assert!(resolver.topological_sort(&["nonexistent"]).is_err());
    }
}
