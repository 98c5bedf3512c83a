use sidbroker_common::{EngineName, Error, Result};
use sidbroker_rules::JobRule;
use sidbroker_sid::Sid;

use super::Broker;

impl Broker {
    /// Jobs implementing `action` for `sid`, in declaration order.
    ///
    /// A job qualifies when its action equals `action` and it either carries
    /// the `"all"` sentinel or one of its patterns matches.
    pub fn get_jobs(&self, sid: &Sid, action: &str) -> Result<Vec<&JobRule>> {
        let mut found = Vec::new();
        for job in self.jobs.for_action(action) {
            if job.matches_all() || self.job_matches(job, sid)? {
                found.push(job);
            }
        }
        Ok(found)
    }

    /// [`Broker::get_jobs`], keeping only jobs that run in `engine`.
    pub fn get_jobs_for_engine(
        &self,
        sid: &Sid,
        action: &str,
        engine: &EngineName,
    ) -> Result<Vec<&JobRule>> {
        let mut jobs = self.get_jobs(sid, action)?;
        jobs.retain(|job| job.runs_on(engine));
        Ok(jobs)
    }

    /// The first job implementing `action` for `sid`.
    ///
    /// A miss is logged and returned as `Ok(None)`.
    pub fn get_job(&self, sid: &Sid, action: &str) -> Result<Option<&JobRule>> {
        let job = self.get_jobs(sid, action)?.into_iter().next();
        if job.is_none() {
            tracing::warn!(sid = %sid, action, "No job found");
        }
        Ok(job)
    }

    fn job_matches(&self, job: &JobRule, sid: &Sid) -> Result<bool> {
        self.matcher.matches_any(sid, &job.patterns).map_err(|e| {
            Error::configuration(
                format!("job '{}' for sid '{}'", job.name, sid),
                e.to_string(),
            )
        })
    }
}
